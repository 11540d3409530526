use clap::{Args, Parser, Subcommand};
use springs_core::{build_simulation_context, run_frames, Preset, ScenarioConfig, DEFAULT_SPEED};
use std::path::PathBuf;
use std::process::ExitCode;

mod utils;
mod viewer;

#[derive(Parser)]
#[command(name = "springs")]
#[command(about = "Springs - planar mass-spring and pendulum simulator", long_about = None)]
struct Cli {
    /// Name of a log file under `logs/`; logs go to stderr when omitted
    #[arg(short('l'), long, global = true)]
    log_file: Option<String>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario headless and print its energy once per frame
    Run {
        #[command(flatten)]
        source: Source,

        #[command(flatten)]
        overrides: Overrides,

        /// Number of frames to run
        #[arg(short, long, default_value_t = 100)]
        frames: usize,

        /// Integration steps per frame
        #[arg(long, default_value_t = DEFAULT_SPEED)]
        speed: usize,
    },
    /// Open an interactive window on a scenario
    View {
        #[command(flatten)]
        source: Source,

        #[command(flatten)]
        overrides: Overrides,
    },
}

/// Where the scenario comes from
#[derive(Args, Debug, Clone)]
pub struct Source {
    /// Built-in scenario: pendulum, vertical-spring, or horizontal-spring
    #[arg(short, long, default_value = "pendulum", conflicts_with = "scenario")]
    preset: Preset,

    /// Path to a YAML scenario file
    #[arg(short, long)]
    scenario: Option<PathBuf>,
}

impl Source {
    pub fn load(&self) -> Result<ScenarioConfig, springs_core::ScenarioError> {
        match &self.scenario {
            Some(path) => ScenarioConfig::load(path),
            None => Ok(self.preset.scenario()),
        }
    }

    pub fn watched_path(&self) -> Option<&PathBuf> {
        self.scenario.as_ref()
    }
}

/// Replacements for the scenario's world parameters
#[derive(Args, Debug, Clone, Copy)]
pub struct Overrides {
    /// Damping coefficient
    #[arg(long)]
    friction: Option<f64>,

    /// Gravitational acceleration along -y
    #[arg(long)]
    gravity: Option<f64>,

    /// Integration step in seconds
    #[arg(long)]
    delta_t: Option<f64>,
}

impl Overrides {
    pub fn apply(&self, scenario: &mut ScenarioConfig) {
        if let Some(friction) = self.friction {
            scenario.world.friction = friction;
        }
        if let Some(gravity) = self.gravity {
            scenario.world.gravity = gravity;
        }
        if let Some(delta_t) = self.delta_t {
            scenario.world.delta_t = delta_t;
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let _guard = utils::configure_logger(cli.log_file.as_deref(), cli.verbose)?;

    match cli.command {
        Commands::Run {
            source,
            overrides,
            frames,
            speed,
        } => run_scenario(&source, overrides, frames, speed),
        Commands::View { source, overrides } => viewer::launch(source, overrides),
    }
}

fn run_scenario(
    source: &Source,
    overrides: Overrides,
    frames: usize,
    speed: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut scenario = source.load()?;
    overrides.apply(&mut scenario);
    let mut ctx = build_simulation_context(&scenario)?;
    ftlog::info!(
        "running {frames} frames of {speed} steps, delta_t = {}",
        ctx.world.delta_t()
    );

    let log = run_frames(&mut ctx, frames, speed)?;

    for (t, e) in log.samples() {
        println!(
            "t = {:.3} E = {:.6} K = {:.6} U = {:.6}",
            t, e.total, e.kinetic, e.potential
        );
    }
    println!(
        "max drift = {:.3e} (relative {:.3e})",
        log.max_drift(),
        log.relative_drift()
    );

    Ok(())
}
