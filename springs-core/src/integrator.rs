//! Fixed-step time integration
//!
//! Free particles advance with velocity-Verlet. A pendulum bob has a single
//! degree of freedom, its angle about the anchor, and advances with the same
//! scheme in that angle before being mapped back onto the arm's circle.

use glam::DVec2;
use slotmap::SlotMap;

use crate::engine::{Connection, ConnectionId, Particle, ParticleId, World};
use crate::error::PhysicsError;

/// Angle of a pendulum bob measured from the downward vertical through its
/// anchor, and its rate of change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngularState {
    pub theta: f64,
    pub theta_dot: f64,
}

impl AngularState {
    /// Derive the angle from the bob's offset to its anchor and the angular
    /// velocity from the tangential part of its velocity
    pub fn from_cartesian(offset: DVec2, velocity: DVec2, length: f64) -> Self {
        let theta = offset.x.atan2(-offset.y);
        let theta_dot = velocity.dot(tangent(theta)) / length;
        Self { theta, theta_dot }
    }

    /// Bob position relative to the anchor
    pub fn offset(&self, length: f64) -> DVec2 {
        DVec2::new(self.theta.sin(), -self.theta.cos()) * length
    }

    pub fn velocity(&self, length: f64) -> DVec2 {
        tangent(self.theta) * (length * self.theta_dot)
    }
}

/// Unit vector along the swing circle, pointing toward increasing `theta`
pub fn tangent(theta: f64) -> DVec2 {
    DVec2::new(theta.cos(), theta.sin())
}

/// Angular acceleration of a bob from the tangential part of its net force
///
/// `force` is the bob's full net force, so friction and any springs attached
/// to the bob act along the swing too. Under gravity alone this reduces to
/// `-(g / L) sin(theta)`. The radial part is carried by the rigid arm.
pub fn angular_acceleration(force: DVec2, mass: f64, theta: f64, length: f64) -> f64 {
    force.dot(tangent(theta)) / (mass * length)
}

/// What the first half of a step did to a particle
#[derive(Debug, Clone, Copy)]
enum Motion {
    Fixed,
    Free { a0: DVec2 },
    Swinging { alpha0: f64, length: f64 },
}

/// Advance the world by one `delta_t`
///
/// All positions move first, then forces are recomputed once for the whole
/// world, then all velocities are updated from the average of the old and
/// new accelerations. If the recomputation fails the particles are restored
/// and `time` does not advance.
pub fn step(world: &mut World) -> Result<(), PhysicsError> {
    let dt = world.config.delta_t;
    let saved = world.particles.clone();

    let motions = {
        let World {
            particles,
            particle_order,
            connections,
            ..
        } = &mut *world;
        particle_order
            .iter()
            .map(|&id| (id, drift(particles, connections, id, dt)))
            .collect::<Vec<_>>()
    };

    if let Err(err) = world.compute_forces() {
        world.particles = saved;
        ftlog::warn!("step at t = {} rolled back: {err}", world.time);
        return Err(err);
    }

    for (id, motion) in motions {
        if let Some(particle) = world.particles.get_mut(id) {
            kick(particle, motion, dt);
        }
    }

    world.time += dt;
    Ok(())
}

/// x += v dt + a0 dt^2 / 2, in Cartesian or angular coordinates
fn drift(
    particles: &mut SlotMap<ParticleId, Particle>,
    connections: &SlotMap<ConnectionId, Connection>,
    id: ParticleId,
    dt: f64,
) -> Motion {
    let pivot = particles
        .get(id)
        .and_then(|p| p.constraint)
        .and_then(|c| connections.get(c.arm))
        .and_then(|arm| Some((particles.get(arm.from)?.position, arm.natural_length)));

    let Some(particle) = particles.get_mut(id) else {
        return Motion::Fixed;
    };
    if particle.anchored {
        return Motion::Fixed;
    }

    match pivot {
        Some((anchor, length)) => {
            let (force, mass) = (particle.force, particle.mass);
            let Some(state) = particle.swing(anchor, length) else {
                return Motion::Fixed;
            };
            let alpha0 = angular_acceleration(force, mass, state.theta, length);
            state.theta += state.theta_dot * dt + 0.5 * alpha0 * dt * dt;
            let offset = state.offset(length);
            particle.position = anchor + offset;
            Motion::Swinging { alpha0, length }
        }
        None => {
            let a0 = particle.force / particle.mass;
            particle.position += particle.velocity * dt + 0.5 * a0 * dt * dt;
            Motion::Free { a0 }
        }
    }
}

/// v += (a0 + a1) dt / 2, with `a1` read from the freshly computed forces
fn kick(particle: &mut Particle, motion: Motion, dt: f64) {
    match motion {
        Motion::Fixed => {}
        Motion::Free { a0 } => {
            let a1 = particle.force / particle.mass;
            particle.velocity += 0.5 * (a0 + a1) * dt;
        }
        Motion::Swinging { alpha0, length } => {
            let (force, mass) = (particle.force, particle.mass);
            let Some(state) = particle.constraint.as_mut().and_then(|c| c.angular.as_mut()) else {
                return;
            };
            let alpha1 = angular_acceleration(force, mass, state.theta, length);
            state.theta_dot += 0.5 * (alpha0 + alpha1) * dt;
            let velocity = state.velocity(length);
            particle.velocity = velocity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_angle_measured_from_downward_vertical() {
        let below = AngularState::from_cartesian(DVec2::new(0.0, -2.0), DVec2::ZERO, 2.0);
        assert!(below.theta.abs() < 1e-12);

        let right = AngularState::from_cartesian(DVec2::new(2.0, 0.0), DVec2::ZERO, 2.0);
        assert!((right.theta - FRAC_PI_2).abs() < 1e-12);

        let above = AngularState::from_cartesian(DVec2::new(0.0, 2.0), DVec2::ZERO, 2.0);
        assert!((above.theta.abs() - PI).abs() < 1e-12);
    }

    #[test]
    fn test_offset_inverts_angle_derivation() {
        let offset = DVec2::new(3.0, 4.0);
        let state = AngularState::from_cartesian(offset, DVec2::ZERO, 5.0);
        assert!((state.offset(5.0) - offset).length() < 1e-12);
    }

    #[test]
    fn test_angular_velocity_keeps_only_tangential_part() {
        // Bob straight below the anchor, the tangent there is +x
        let state = AngularState::from_cartesian(DVec2::new(0.0, -2.0), DVec2::new(4.0, 7.0), 2.0);
        assert!((state.theta_dot - 2.0).abs() < 1e-12);
        assert!((state.velocity(2.0) - DVec2::new(4.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_gravity_gives_simple_pendulum_equation() {
        let (g, length, mass, theta) = (9.8, 2.0, 3.0, 0.4_f64);
        let gravity = DVec2::new(0.0, -mass * g);
        let alpha = angular_acceleration(gravity, mass, theta, length);
        assert!((alpha + g / length * theta.sin()).abs() < 1e-12);
    }
}
