//! Determinism tests - the same scenario stepped twice gives identical states

use springs_core::runtime::{build_simulation_context, get_particle_states, run_frames};
use springs_core::scenario::{Preset, ScenarioConfig};

fn run(scenario: &ScenarioConfig) -> Vec<springs_core::ParticleState> {
    let mut ctx = build_simulation_context(scenario).expect("scenario should build");
    run_frames(&mut ctx, 30, 30).expect("run should not fail");
    get_particle_states(&ctx)
}

#[test]
fn test_pendulum_determinism() {
    let scenario = Preset::Pendulum.scenario();
    let first = run(&scenario);
    let second = run(&scenario);

    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.position, b.position);
        assert_eq!(a.velocity, b.velocity);
    }
}

#[test]
fn test_spring_network_determinism() {
    let scenario = ScenarioConfig::from_yaml(
        r#"
world: { delta_t: 0.005, friction: 0.1, gravity: 9.8 }
particles:
  - { x: 0.0, y: 0.0, anchored: true }
  - { x: 1.0, y: -1.0 }
  - { x: -1.0, y: -2.0, mass: 2.0 }
  - { x: 0.5, y: -3.0 }
connections:
  - { kind: spring, from: 0, to: 1 }
  - { kind: spring, from: 1, to: 2, k: 30.0 }
  - { kind: spring, from: 2, to: 3 }
  - { kind: spring, from: 3, to: 1, k: 80.0 }
"#,
    )
    .expect("scenario should parse");

    let results = (0..3).map(|_| run(&scenario)).collect::<Vec<_>>();
    for other in &results[1..] {
        for (a, b) in results[0].iter().zip(other) {
            assert_eq!(a.position, b.position);
        }
    }
}
