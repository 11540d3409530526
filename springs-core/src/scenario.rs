//! Scenario descriptions, loaded from YAML or taken from built-in presets
//!
//! ```yaml
//! world:
//!   delta_t: 0.005
//!   friction: 0.0
//!   gravity: 9.98
//! particles:
//!   - { x: 0.0, y: 0.0, anchored: true }
//!   - { x: 8.66, y: 5.0, mass: 1.0 }
//! connections:
//!   - { kind: pendulum, from: 0, to: 1 }
//!   - { kind: spring, from: 0, to: 1, k: 50.0 }
//! ```
//!
//! Connection endpoints index into `particles`. Every field other than the
//! particle coordinates and the connection endpoints has a default.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::engine::{
    ConnectionKind, ParticleId, World, WorldConfig, DEFAULT_MASS, DEFAULT_SPRING_CONSTANT,
};
use crate::error::ScenarioError;

/// Gravity used by the pendulum preset
pub const PRESET_GRAVITY: f64 = 9.98;

/// Distance from the anchor to the free particle in every preset
pub const PRESET_ARM_LENGTH: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub particles: Vec<ParticleConfig>,
    #[serde(default)]
    pub connections: Vec<ConnectionConfig>,
}

/// Initial state of one particle; particles always start at rest
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ParticleConfig {
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_mass")]
    pub mass: f64,
    #[serde(default)]
    pub anchored: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ConnectionConfig {
    Spring {
        from: usize,
        to: usize,
        #[serde(default = "default_stiffness")]
        k: f64,
    },
    Pendulum {
        from: usize,
        to: usize,
    },
}

const fn default_mass() -> f64 {
    DEFAULT_MASS
}

const fn default_stiffness() -> f64 {
    DEFAULT_SPRING_CONSTANT
}

impl ParticleConfig {
    pub const fn free(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            mass: DEFAULT_MASS,
            anchored: false,
        }
    }

    pub const fn anchored(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            mass: DEFAULT_MASS,
            anchored: true,
        }
    }
}

impl ConnectionConfig {
    pub const fn endpoints(&self) -> (usize, usize) {
        match *self {
            Self::Spring { from, to, .. } | Self::Pendulum { from, to } => (from, to),
        }
    }

    pub const fn kind(&self) -> ConnectionKind {
        match *self {
            Self::Spring { k, .. } => ConnectionKind::Spring { k },
            Self::Pendulum { .. } => ConnectionKind::Pendulum,
        }
    }
}

impl ScenarioConfig {
    pub fn from_yaml(source: &str) -> Result<Self, ScenarioError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml(&source)
    }

    /// Build a world from the scenario
    ///
    /// Returns the world and the particle handles in declaration order.
    pub fn build_world(&self) -> Result<(World, Vec<ParticleId>), ScenarioError> {
        let mut world = World::with_config(self.world);

        let mut ids = Vec::with_capacity(self.particles.len());
        for p in &self.particles {
            ids.push(world.add_particle_with_mass(p.x, p.y, p.mass, p.anchored)?);
        }

        for (idx, connection) in self.connections.iter().enumerate() {
            let (from, to) = connection.endpoints();
            let lookup = |index: usize| {
                ids.get(index).copied().ok_or(ScenarioError::ParticleIndex {
                    connection: idx,
                    index,
                    count: ids.len(),
                })
            };
            world.add_connection(connection.kind(), lookup(from)?, lookup(to)?)?;
        }

        ftlog::info!(
            "built world with {} particles and {} connections",
            world.particle_count(),
            world.connection_count()
        );
        Ok((world, ids))
    }
}

/// Built-in scenarios: a fixed anchor at the origin and one free particle
/// ten meters away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Pendulum arm released 60 degrees above the horizontal, under gravity
    Pendulum,
    /// Spring hanging straight down, at rest length
    VerticalSpring,
    /// Spring lying along +x, at rest length
    HorizontalSpring,
}

impl Preset {
    pub const ALL: [Self; 3] = [Self::Pendulum, Self::VerticalSpring, Self::HorizontalSpring];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Pendulum => "pendulum",
            Self::VerticalSpring => "vertical-spring",
            Self::HorizontalSpring => "horizontal-spring",
        }
    }

    pub fn scenario(self) -> ScenarioConfig {
        let l = PRESET_ARM_LENGTH;
        let (bob, world, kind) = match self {
            Self::Pendulum => {
                let angle = std::f64::consts::FRAC_PI_3;
                (
                    ParticleConfig::free(l * angle.sin(), l * angle.cos()),
                    WorldConfig {
                        gravity: PRESET_GRAVITY,
                        ..WorldConfig::default()
                    },
                    ConnectionConfig::Pendulum { from: 0, to: 1 },
                )
            }
            Self::VerticalSpring => (
                ParticleConfig::free(0.0, -l),
                WorldConfig::default(),
                ConnectionConfig::Spring {
                    from: 0,
                    to: 1,
                    k: DEFAULT_SPRING_CONSTANT,
                },
            ),
            Self::HorizontalSpring => (
                ParticleConfig::free(l, 0.0),
                WorldConfig::default(),
                ConnectionConfig::Spring {
                    from: 0,
                    to: 1,
                    k: DEFAULT_SPRING_CONSTANT,
                },
            ),
        };

        ScenarioConfig {
            world,
            particles: vec![ParticleConfig::anchored(0.0, 0.0), bob],
            connections: vec![kind],
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| ScenarioError::UnknownPreset(s.to_string()))
    }
}
