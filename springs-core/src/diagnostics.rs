//! Energy diagnostics for validating the integrator
//!
//! With zero friction the total energy of a world should stay near its
//! initial value. Secular drift means the integrator is wrong or `delta_t`
//! is too large for the stiffest spring.

use crate::engine::World;

/// Energy snapshot of a world
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Energy {
    /// `kinetic + potential`
    pub total: f64,
    pub kinetic: f64,
    /// Summed over connections
    pub potential: f64,
}

/// Kinetic, potential, and total energy of `world`
pub fn energy(world: &World) -> Energy {
    let kinetic = world.particles().map(|(_, p)| p.kinetic_energy()).sum::<f64>();
    // Connections held by the world always have both endpoints
    let gravity = world.gravity();
    let potential = world
        .connections()
        .map(|(_, c)| c.potential(&world.particles[c.from], &world.particles[c.to], gravity))
        .sum::<f64>();
    Energy {
        total: kinetic + potential,
        kinetic,
        potential,
    }
}

impl World {
    pub fn energy(&self) -> Energy {
        energy(self)
    }
}

/// Energy samples over time, one per recorded instant
#[derive(Debug, Clone, Default)]
pub struct EnergyLog {
    samples: Vec<(f64, Energy)>,
}

impl EnergyLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, time: f64, energy: Energy) {
        self.samples.push((time, energy));
    }

    pub fn record_world(&mut self, world: &World) {
        self.record(world.time(), world.energy());
    }

    pub fn samples(&self) -> &[(f64, Energy)] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn initial(&self) -> Option<Energy> {
        self.samples.first().map(|&(_, e)| e)
    }

    pub fn last(&self) -> Option<Energy> {
        self.samples.last().map(|&(_, e)| e)
    }

    /// Largest `|E(t) - E(0)|` over the log
    pub fn max_drift(&self) -> f64 {
        let Some(initial) = self.initial() else {
            return 0.0;
        };
        self.samples
            .iter()
            .map(|(_, e)| (e.total - initial.total).abs())
            .fold(0.0, f64::max)
    }

    /// `max_drift` relative to `|E(0)|`, or the absolute drift when `E(0)` is zero
    pub fn relative_drift(&self) -> f64 {
        let drift = self.max_drift();
        match self.initial() {
            Some(initial) if initial.total != 0.0 => drift / initial.total.abs(),
            _ => drift,
        }
    }
}
