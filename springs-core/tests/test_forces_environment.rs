//! Unit tests for friction and gravity in the force pass

use glam::DVec2;
use springs_core::engine::{World, WorldConfig};
use springs_core::tests::test_helpers::{approx_eq, approx_eq_vec, run_steps};

#[test]
fn test_gravity_pulls_down_in_proportion_to_mass() {
    let mut world = World::with_config(WorldConfig {
        gravity: 9.8,
        ..WorldConfig::default()
    });
    let p = world.add_particle_with_mass(1.0, 2.0, 2.0, false).unwrap();

    assert!(approx_eq_vec(
        world.particle(p).unwrap().force(),
        DVec2::new(0.0, -19.6),
        1e-12
    ));
}

#[test]
fn test_zero_friction_and_gravity_reset_forces() {
    let mut world = World::new();
    let p = world.add_particle(0.0, 0.0, false).unwrap();
    assert_eq!(world.particle(p).unwrap().force(), DVec2::ZERO);
}

#[test]
fn test_friction_opposes_velocity() {
    let mut world = World::with_config(WorldConfig {
        gravity: 9.8,
        ..WorldConfig::default()
    });
    let p = world.add_particle(0.0, 0.0, false).unwrap();
    run_steps(&mut world, 50);

    world.set_friction(0.5).unwrap();
    let particle = world.particle(p).unwrap();
    let v = particle.velocity();
    assert!(v.y < 0.0);
    assert!(approx_eq(particle.force().x, -0.5 * v.x, 1e-12));
    assert!(approx_eq(particle.force().y, -0.5 * v.y - 9.8, 1e-12));
}

#[test]
fn test_parameter_setters_recompute_forces() {
    let mut world = World::new();
    let p = world.add_particle(0.0, 0.0, false).unwrap();

    world.set_gravity(3.0).unwrap();
    assert!(approx_eq(world.particle(p).unwrap().force().y, -3.0, 1e-12));

    // Negative gravity is accepted and pulls upward
    world.set_gravity(-3.0).unwrap();
    assert!(approx_eq(world.particle(p).unwrap().force().y, 3.0, 1e-12));
}

#[test]
fn test_force_pass_is_idempotent() {
    let mut world = World::with_config(WorldConfig {
        gravity: 9.8,
        friction: 0.2,
        ..WorldConfig::default()
    });
    let p = world.add_particle(0.0, 0.0, false).unwrap();
    run_steps(&mut world, 10);

    // The force stored by the step used the pre-kick velocity, refresh it first
    world.compute_forces().unwrap();
    let before = world.particle(p).unwrap().force();
    world.compute_forces().unwrap();
    world.compute_forces().unwrap();
    assert_eq!(world.particle(p).unwrap().force(), before);
}
