//! Error types for the physics core and scenario loading

use thiserror::Error;

use crate::engine::{ConnectionId, ParticleId};

/// Rejected topology requests and arithmetic failures in the world
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PhysicsError {
    #[error("attempting to connect particle {0:?} with itself")]
    SelfConnection(ParticleId),

    #[error("one of the two particles of a pendulum arm must be anchored")]
    PendulumWithoutAnchor,

    #[error("particle {bob:?} already hangs from pendulum arm {arm:?}")]
    AlreadyConstrained { bob: ParticleId, arm: ConnectionId },

    #[error("unknown particle {0:?}")]
    UnknownParticle(ParticleId),

    #[error("unknown connection {0:?}")]
    UnknownConnection(ConnectionId),

    #[error("particles {from:?} and {to:?} coincide, the connection has no direction")]
    DegenerateGeometry { from: ParticleId, to: ParticleId },

    #[error("particle mass must be positive, got {0}")]
    NonPositiveMass(f64),
}

/// Failure to turn a scenario description into a world
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid scenario: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("connection {connection} refers to particle {index}, but only {count} are declared")]
    ParticleIndex {
        connection: usize,
        index: usize,
        count: usize,
    },

    #[error("unknown preset '{0}' (expected one of: pendulum, vertical-spring, horizontal-spring)")]
    UnknownPreset(String),

    #[error(transparent)]
    Physics(#[from] PhysicsError),
}
