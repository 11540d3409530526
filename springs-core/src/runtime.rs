use std::path::Path;

use glam::DVec2;

use crate::diagnostics::EnergyLog;
use crate::engine::{ParticleId, World};
use crate::error::{PhysicsError, ScenarioError};
use crate::scenario::ScenarioConfig;

/// Integration steps per rendered frame unless the caller asks otherwise
pub const DEFAULT_SPEED: usize = 30;

/// A world being driven frame by frame
#[derive(Debug, Clone)]
pub struct SimulationContext {
    pub world: World,
    /// Handles of the scenario's particles, in declaration order
    pub particle_ids: Vec<ParticleId>,
    pub current_step: usize,
    /// `None` runs until the caller stops
    pub max_steps: Option<usize>,
}

/// Render-ready view of one particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleState {
    pub id: ParticleId,
    pub position: DVec2,
    pub velocity: DVec2,
    pub mass: f64,
    pub anchored: bool,
}

impl SimulationContext {
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn is_finished(&self) -> bool {
        self.max_steps.is_some_and(|max| self.current_step >= max)
    }
}

pub fn build_simulation_context(
    scenario: &ScenarioConfig,
) -> Result<SimulationContext, ScenarioError> {
    let (world, particle_ids) = scenario.build_world()?;
    Ok(SimulationContext {
        world,
        particle_ids,
        current_step: 0,
        max_steps: None,
    })
}

pub fn build_simulation_context_from_file<P: AsRef<Path>>(
    path: P,
) -> Result<SimulationContext, ScenarioError> {
    let scenario = ScenarioConfig::load(path)?;
    build_simulation_context(&scenario)
}

/// Advance one step unless the context is already finished
///
/// Returns `true` once `max_steps` has been reached.
pub fn step_simulation(ctx: &mut SimulationContext) -> Result<bool, PhysicsError> {
    if ctx.is_finished() {
        return Ok(true);
    }
    ctx.world.step()?;
    ctx.current_step += 1;
    Ok(ctx.is_finished())
}

/// Run `frames` frames of `speed` steps each, sampling energy before the
/// first frame and after every frame
pub fn run_frames(
    ctx: &mut SimulationContext,
    frames: usize,
    speed: usize,
) -> Result<EnergyLog, PhysicsError> {
    let mut log = EnergyLog::new();
    log.record_world(&ctx.world);

    'frames: for frame in 0..frames {
        for _ in 0..speed {
            if step_simulation(ctx)? {
                log.record_world(&ctx.world);
                ftlog::debug!("reached max steps during frame {frame}");
                break 'frames;
            }
        }
        log.record_world(&ctx.world);
    }

    Ok(log)
}

pub fn get_particle_states(ctx: &SimulationContext) -> Vec<ParticleState> {
    ctx.world
        .particles()
        .map(|(id, p)| ParticleState {
            id,
            position: p.position(),
            velocity: p.velocity(),
            mass: p.mass(),
            anchored: p.anchored(),
        })
        .collect()
}
