//! Tests for the angular update of pendulum bobs

use std::f64::consts::PI;

use glam::DVec2;
use springs_core::engine::{ConnectionKind, World};
use springs_core::scenario::Preset;
use springs_core::tests::test_helpers::{anchored_pair, approx_eq, approx_eq_vec, config, run_steps};

#[test]
fn test_arm_length_is_preserved() {
    let (mut world, ids) = Preset::Pendulum.scenario().build_world().unwrap();
    let (anchor, bob) = (ids[0], ids[1]);

    for _ in 0..5000 {
        world.step().unwrap();
        let d = world
            .particle(anchor)
            .unwrap()
            .position()
            .distance(world.particle(bob).unwrap().position());
        assert!(approx_eq(d, 10.0, 1e-9), "arm length {d} at t = {}", world.time());
    }
}

#[test]
fn test_pendulum_energy_is_bounded() {
    let (mut world, _) = Preset::Pendulum.scenario().build_world().unwrap();
    let initial = world.energy();
    // Released from rest 60 degrees above the horizontal: m g L (1 - cos 120)
    assert!(approx_eq(initial.potential, 9.98 * 10.0 * 1.5, 1e-9));
    assert_eq!(initial.kinetic, 0.0);

    for _ in 0..5000 {
        world.step().unwrap();
        let e = world.energy();
        assert!(
            (e.total - initial.total).abs() < 1e-3 * initial.total,
            "energy {} vs {} at t = {}",
            e.total,
            initial.total,
            world.time()
        );
    }
}

#[test]
fn test_angular_state_derived_on_first_step() {
    let (mut world, _, bob, _) = anchored_pair(
        config(0.005, 9.8),
        DVec2::new(3.0, -4.0),
        ConnectionKind::pendulum(),
    );
    let particle = world.particle(bob).unwrap();
    assert!(particle.is_constrained());
    assert!(particle.angular_state().is_none());

    world.step().unwrap();

    let state = world.particle(bob).unwrap().angular_state().unwrap();
    let theta0 = 3.0_f64.atan2(4.0);
    // One step from rest moves theta by alpha0 dt^2 / 2
    let alpha0 = -(9.8 / 5.0) * theta0.sin();
    assert!(approx_eq(state.theta, theta0 + 0.5 * alpha0 * 0.005 * 0.005, 1e-12));
    assert!(state.theta_dot < 0.0);
}

#[test]
fn test_small_angle_half_period() {
    let (length, g, theta0, dt) = (2.0, 9.8, 0.05_f64, 0.001);
    let (mut world, _, bob, _) = anchored_pair(
        config(dt, g),
        DVec2::new(length * theta0.sin(), -length * theta0.cos()),
        ConnectionKind::pendulum(),
    );

    let half_period = PI * (length / g).sqrt();
    let steps = (half_period / dt).round() as usize;
    run_steps(&mut world, steps);

    let state = world.particle(bob).unwrap().angular_state().unwrap();
    assert!(approx_eq(state.theta, -theta0, 5e-4), "theta = {}", state.theta);
}

#[test]
fn test_bob_velocity_is_tangential() {
    let (mut world, ids) = Preset::Pendulum.scenario().build_world().unwrap();
    let bob = ids[1];

    for _ in 0..1000 {
        world.step().unwrap();
        let p = world.particle(bob).unwrap();
        let state = p.angular_state().unwrap();
        assert!(p.velocity().dot(p.position()).abs() < 1e-9);
        assert!(approx_eq(p.velocity().length(), 10.0 * state.theta_dot.abs(), 1e-9));
    }
}

#[test]
fn test_pendulum_without_gravity_hangs_still() {
    let (mut world, _, bob, _) = anchored_pair(
        config(0.01, 0.0),
        DVec2::new(6.0, 8.0),
        ConnectionKind::pendulum(),
    );

    run_steps(&mut world, 500);

    let p = world.particle(bob).unwrap();
    assert!(approx_eq_vec(p.position(), DVec2::new(6.0, 8.0), 1e-9));
    assert!(p.velocity().length() < 1e-12);
}

#[test]
fn test_friction_slows_the_swing() {
    let (mut world, ids) = Preset::Pendulum.scenario().build_world().unwrap();
    world.set_friction(0.5).unwrap();
    let initial = world.energy().total;

    run_steps(&mut world, 4000);

    assert!(world.energy().total < 0.5 * initial);
    let d = world.particle(ids[1]).unwrap().position().length();
    assert!(approx_eq(d, 10.0, 1e-9));
}

#[test]
fn test_spring_on_bob_keeps_arm_length() {
    let (mut world, anchor, bob, _) = anchored_pair(
        config(0.002, 9.8),
        DVec2::new(0.0, -5.0),
        ConnectionKind::pendulum(),
    );
    let side = world.add_particle(2.0, -5.0, true).unwrap();
    world.add_connection(ConnectionKind::spring(), side, bob).unwrap();
    world.move_particle(side, DVec2::new(3.0, -5.0)).unwrap();

    run_steps(&mut world, 200);

    let p = world.particle(bob).unwrap();
    // The stretched spring drags the bob toward +x along its circle
    assert!(p.position().x > 0.0);
    let d = p.position().distance(world.particle(anchor).unwrap().position());
    assert!(approx_eq(d, 5.0, 1e-9));
}

#[test]
fn test_removed_arm_releases_bob() {
    let (mut world, _, bob, arm) = anchored_pair(
        config(0.01, 9.8),
        DVec2::new(5.0, 0.0),
        ConnectionKind::pendulum(),
    );
    run_steps(&mut world, 20);
    let velocity = world.particle(bob).unwrap().velocity();

    world.remove_connection(arm).unwrap();
    let p = world.particle(bob).unwrap();
    assert!(!p.is_constrained());
    assert_eq!(p.velocity(), velocity);

    run_steps(&mut world, 100);
    // Free flight under gravity, no longer held at radius 5
    assert!(world.particle(bob).unwrap().position().length() > 5.5);
}

#[test]
fn test_anchored_bob_does_not_swing() {
    let mut world = World::with_config(config(0.01, 9.8));
    let pivot = world.add_particle(0.0, 0.0, true).unwrap();
    let bob = world.add_particle(3.0, 0.0, true).unwrap();
    world.add_connection(ConnectionKind::pendulum(), pivot, bob).unwrap();

    run_steps(&mut world, 100);

    assert_eq!(world.particle(bob).unwrap().position(), DVec2::new(3.0, 0.0));
}
