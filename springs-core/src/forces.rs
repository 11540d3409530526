//! Force accumulation over the whole world

use glam::DVec2;
use slotmap::SecondaryMap;

use crate::engine::{ConnectionKind, ParticleId, World};
use crate::error::PhysicsError;

/// Net force on every particle for the current positions and velocities
///
/// Each particle starts from friction and gravity, then every spring adds
/// its Hooke force to `from` and the opposite force to `to`. Pendulum arms
/// add nothing here: the anchor never moves, and the integrator projects the
/// bob's net force onto its swing.
pub fn accumulate_forces(world: &World) -> Result<SecondaryMap<ParticleId, DVec2>, PhysicsError> {
    let friction = world.config.friction;
    let gravity = world.config.gravity;

    let mut forces = SecondaryMap::with_capacity(world.particles.len());
    for (id, particle) in world.particles() {
        let v = particle.velocity;
        forces.insert(
            id,
            DVec2::new(-friction * v.x, -friction * v.y - particle.mass * gravity),
        );
    }

    for (_, connection) in world.connections() {
        match connection.kind {
            ConnectionKind::Spring { k } => {
                let (from, to) = (connection.from, connection.to);
                let f = spring_force(
                    world.particles[from].position,
                    world.particles[to].position,
                    k,
                    connection.natural_length,
                )
                .ok_or(PhysicsError::DegenerateGeometry { from, to })?;
                forces[from] += f;
                forces[to] -= f;
            }
            ConnectionKind::Pendulum => {}
        }
    }

    Ok(forces)
}

/// Hooke force on the `from` end of a spring; the `to` end receives its negation
///
/// `None` when the two ends coincide.
pub fn spring_force(from: DVec2, to: DVec2, k: f64, natural_length: f64) -> Option<DVec2> {
    let r = from - to;
    let d = r.length();
    if d == 0.0 {
        return None;
    }
    let magnitude = k * (d - natural_length);
    Some(-magnitude * r / d)
}

impl World {
    /// Overwrite every particle's force with the net force for the current state
    ///
    /// Forces are left untouched on failure.
    pub fn compute_forces(&mut self) -> Result<(), PhysicsError> {
        let forces = accumulate_forces(self)?;
        for (id, force) in forces {
            if let Some(particle) = self.particles.get_mut(id) {
                particle.force = force;
            }
        }
        Ok(())
    }

    /// Advance the simulation by one `delta_t`
    pub fn step(&mut self) -> Result<(), PhysicsError> {
        crate::integrator::step(self)
    }
}
