pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod forces;
pub mod integrator;
pub mod runtime;
pub mod scenario;

pub use diagnostics::{Energy, EnergyLog};
pub use engine::{
    Connection, ConnectionId, ConnectionKind, Particle, ParticleId, PendulumConstraint, World,
    WorldConfig,
};
pub use error::{PhysicsError, ScenarioError};
pub use integrator::AngularState;
pub use runtime::{
    build_simulation_context, build_simulation_context_from_file, get_particle_states,
    run_frames, step_simulation, ParticleState, SimulationContext, DEFAULT_SPEED,
};
pub use scenario::{ConnectionConfig, ParticleConfig, Preset, ScenarioConfig};
