use glam::DVec2;
use serde::Deserialize;
use slotmap::{new_key_type, SlotMap};

use crate::error::PhysicsError;
use crate::integrator::AngularState;

new_key_type! {
    /// Handle to a particle owned by a [`World`]
    pub struct ParticleId;

    /// Handle to a connection owned by a [`World`]
    pub struct ConnectionId;
}

/// Stiffness of a spring created without an explicit `k`
pub const DEFAULT_SPRING_CONSTANT: f64 = 50.0;

/// Mass of a particle created without an explicit mass
pub const DEFAULT_MASS: f64 = 1.0;

/// Step size of a world created without an explicit configuration
pub const DEFAULT_DELTA_T: f64 = 0.005;

/// Marks a particle as the bob of a pendulum arm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendulumConstraint {
    pub arm: ConnectionId,
    /// Derived from the Cartesian state on the first step after the bob
    /// became constrained, owned by the integrator from then on
    pub angular: Option<AngularState>,
}

/// A point mass in the simulation
#[derive(Debug, Clone)]
pub struct Particle {
    pub(crate) position: DVec2,
    pub(crate) velocity: DVec2,
    pub(crate) force: DVec2,
    pub(crate) mass: f64,
    pub(crate) anchored: bool,
    pub(crate) constraint: Option<PendulumConstraint>,
}

impl Particle {
    fn new(position: DVec2, mass: f64, anchored: bool) -> Self {
        Self {
            position,
            velocity: DVec2::ZERO,
            force: DVec2::ZERO,
            mass,
            anchored,
            constraint: None,
        }
    }

    pub const fn position(&self) -> DVec2 {
        self.position
    }

    pub const fn velocity(&self) -> DVec2 {
        self.velocity
    }

    /// Net force for the current positions and velocities
    pub const fn force(&self) -> DVec2 {
        self.force
    }

    pub const fn mass(&self) -> f64 {
        self.mass
    }

    pub const fn anchored(&self) -> bool {
        self.anchored
    }

    pub const fn constraint(&self) -> Option<&PendulumConstraint> {
        self.constraint.as_ref()
    }

    pub const fn is_constrained(&self) -> bool {
        self.constraint.is_some()
    }

    /// Angle and angular velocity of a pendulum bob, once the integrator has derived them
    pub fn angular_state(&self) -> Option<AngularState> {
        self.constraint.and_then(|c| c.angular)
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.length_squared()
    }

    /// Angular state of a bob swinging about `anchor`, derived from the
    /// Cartesian state if the integrator has not taken ownership yet
    pub(crate) fn swing(&mut self, anchor: DVec2, length: f64) -> Option<&mut AngularState> {
        let (position, velocity) = (self.position, self.velocity);
        let constraint = self.constraint.as_mut()?;
        Some(
            constraint.angular.get_or_insert_with(|| {
                AngularState::from_cartesian(position - anchor, velocity, length)
            }),
        )
    }
}

/// The variants a connection can take
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectionKind {
    /// Hookean spring with stiffness `k`
    Spring { k: f64 },
    /// Rigid arm from an anchored pivot to a swinging bob
    Pendulum,
}

impl ConnectionKind {
    pub const fn spring() -> Self {
        Self::Spring {
            k: DEFAULT_SPRING_CONSTANT,
        }
    }

    pub const fn spring_with_stiffness(k: f64) -> Self {
        Self::Spring { k }
    }

    pub const fn pendulum() -> Self {
        Self::Pendulum
    }

    pub const fn is_pendulum(&self) -> bool {
        matches!(self, Self::Pendulum)
    }
}

/// An edge between two particles of a [`World`]
///
/// The natural length is the separation of the two particles at the moment
/// the connection was created. It is the zero-force length of a spring and
/// the radius of a pendulum arm.
#[derive(Debug, Clone)]
pub struct Connection {
    pub(crate) from: ParticleId,
    pub(crate) to: ParticleId,
    pub(crate) kind: ConnectionKind,
    pub(crate) natural_length: f64,
}

impl Connection {
    pub const fn from(&self) -> ParticleId {
        self.from
    }

    /// For a pendulum arm this is always the bob
    pub const fn to(&self) -> ParticleId {
        self.to
    }

    pub const fn kind(&self) -> ConnectionKind {
        self.kind
    }

    pub const fn natural_length(&self) -> f64 {
        self.natural_length
    }

    pub fn touches(&self, id: ParticleId) -> bool {
        self.from == id || self.to == id
    }

    fn endpoints<'w>(
        &self,
        world: &'w World,
    ) -> Result<(&'w Particle, &'w Particle), PhysicsError> {
        let from = world
            .particles
            .get(self.from)
            .ok_or(PhysicsError::UnknownParticle(self.from))?;
        let to = world
            .particles
            .get(self.to)
            .ok_or(PhysicsError::UnknownParticle(self.to))?;
        Ok((from, to))
    }

    /// Fails with `UnknownParticle` if an endpoint is no longer in `world`
    pub fn current_length(&self, world: &World) -> Result<f64, PhysicsError> {
        let (from, to) = self.endpoints(world)?;
        Ok(from.position.distance(to.position))
    }

    /// Potential energy stored in the connection
    ///
    /// A spring stores `k (l - l0)^2 / 2`. A pendulum arm stores the bob's
    /// gravitational energy above the lowest point of its swing,
    /// `m g L (1 - cos theta)`, which equals `m g (L + y_bob - y_anchor)`.
    /// Fails with `UnknownParticle` if an endpoint is no longer in `world`.
    pub fn energy(&self, world: &World) -> Result<f64, PhysicsError> {
        let (from, to) = self.endpoints(world)?;
        Ok(self.potential(from, to, world.config.gravity))
    }

    /// Energy for endpoints already looked up by the caller
    pub(crate) fn potential(&self, from: &Particle, to: &Particle, gravity: f64) -> f64 {
        match self.kind {
            ConnectionKind::Spring { k } => {
                let stretch = from.position.distance(to.position) - self.natural_length;
                0.5 * k * stretch * stretch
            }
            ConnectionKind::Pendulum => {
                let height = self.natural_length + (to.position.y - from.position.y);
                to.mass * gravity * height
            }
        }
    }
}

/// Global parameters of a world
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Fixed integration step in seconds
    pub delta_t: f64,
    /// Damping coefficient applied against velocity
    pub friction: f64,
    /// Gravitational acceleration along -y
    pub gravity: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            delta_t: DEFAULT_DELTA_T,
            friction: 0.0,
            gravity: 0.0,
        }
    }
}

/// The physics world containing particles and connections
///
/// Every mutation recomputes forces before returning, so the force stored on
/// each particle always matches the current topology and parameters.
#[derive(Debug, Clone, Default)]
pub struct World {
    pub(crate) particles: SlotMap<ParticleId, Particle>,
    pub(crate) particle_order: Vec<ParticleId>,
    pub(crate) connections: SlotMap<ConnectionId, Connection>,
    pub(crate) connection_order: Vec<ConnectionId>,
    pub(crate) time: f64,
    pub(crate) config: WorldConfig,
}

impl World {
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            particles: SlotMap::with_key(),
            particle_order: Vec::new(),
            connections: SlotMap::with_key(),
            connection_order: Vec::new(),
            time: 0.0,
            config,
        }
    }

    pub const fn config(&self) -> WorldConfig {
        self.config
    }

    /// Elapsed simulation time in seconds
    pub const fn time(&self) -> f64 {
        self.time
    }

    pub const fn friction(&self) -> f64 {
        self.config.friction
    }

    pub const fn gravity(&self) -> f64 {
        self.config.gravity
    }

    pub const fn delta_t(&self) -> f64 {
        self.config.delta_t
    }

    /// Negative values are accepted and accelerate instead of damping
    pub fn set_friction(&mut self, friction: f64) -> Result<(), PhysicsError> {
        self.config.friction = friction;
        self.compute_forces()
    }

    /// Negative values are accepted and pull along +y
    pub fn set_gravity(&mut self, gravity: f64) -> Result<(), PhysicsError> {
        self.config.gravity = gravity;
        self.compute_forces()
    }

    /// Must stay small relative to the stiffest spring, nothing checks this
    pub fn set_delta_t(&mut self, delta_t: f64) {
        self.config.delta_t = delta_t;
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(id)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    /// Particle handles in insertion order
    pub fn particle_ids(&self) -> &[ParticleId] {
        &self.particle_order
    }

    /// Connection handles in insertion order
    pub fn connection_ids(&self) -> &[ConnectionId] {
        &self.connection_order
    }

    pub fn particles(&self) -> impl Iterator<Item = (ParticleId, &Particle)> + '_ {
        self.particle_order
            .iter()
            .map(move |&id| (id, &self.particles[id]))
    }

    pub fn connections(&self) -> impl Iterator<Item = (ConnectionId, &Connection)> + '_ {
        self.connection_order
            .iter()
            .map(move |&id| (id, &self.connections[id]))
    }

    pub fn particle_count(&self) -> usize {
        self.particle_order.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connection_order.len()
    }

    /// Add a particle of unit mass at `(x, y)`
    pub fn add_particle(
        &mut self,
        x: f64,
        y: f64,
        anchored: bool,
    ) -> Result<ParticleId, PhysicsError> {
        self.add_particle_with_mass(x, y, DEFAULT_MASS, anchored)
    }

    pub fn add_particle_with_mass(
        &mut self,
        x: f64,
        y: f64,
        mass: f64,
        anchored: bool,
    ) -> Result<ParticleId, PhysicsError> {
        if mass.is_nan() || mass <= 0.0 {
            ftlog::warn!("rejected particle at ({x}, {y}) with mass {mass}");
            return Err(PhysicsError::NonPositiveMass(mass));
        }

        let id = self
            .particles
            .insert(Particle::new(DVec2::new(x, y), mass, anchored));
        self.particle_order.push(id);
        ftlog::debug!("added particle {id:?} at ({x}, {y}), mass {mass}, anchored {anchored}");

        self.compute_forces()?;
        Ok(id)
    }

    /// Remove a particle together with every connection touching it
    pub fn remove_particle(&mut self, id: ParticleId) -> Result<(), PhysicsError> {
        if !self.particles.contains_key(id) {
            return Err(PhysicsError::UnknownParticle(id));
        }

        let attached = self
            .connections()
            .filter(|(_, c)| c.touches(id))
            .map(|(cid, _)| cid)
            .collect::<Vec<_>>();
        for cid in attached {
            self.detach(cid);
        }

        self.particles.remove(id);
        self.particle_order.retain(|&p| p != id);
        ftlog::debug!("removed particle {id:?}");

        self.compute_forces()
    }

    /// Connect two particles
    ///
    /// A pendulum arm needs at least one anchored endpoint. When only `to` is
    /// anchored the endpoints are swapped so the anchor is always `from`.
    pub fn add_connection(
        &mut self,
        kind: ConnectionKind,
        from: ParticleId,
        to: ParticleId,
    ) -> Result<ConnectionId, PhysicsError> {
        let (from, to) = match self.validate_connection(kind, from, to) {
            Ok(endpoints) => endpoints,
            Err(err) => {
                ftlog::warn!("rejected {kind:?} between {from:?} and {to:?}: {err}");
                return Err(err);
            }
        };

        let natural_length = self.particles[from]
            .position
            .distance(self.particles[to].position);
        let id = self.connections.insert(Connection {
            from,
            to,
            kind,
            natural_length,
        });
        self.connection_order.push(id);

        if kind.is_pendulum() {
            self.particles[to].constraint = Some(PendulumConstraint {
                arm: id,
                angular: None,
            });
        }
        ftlog::debug!(
            "added {kind:?} {id:?} from {from:?} to {to:?}, natural length {natural_length}"
        );

        self.compute_forces()?;
        Ok(id)
    }

    fn validate_connection(
        &self,
        kind: ConnectionKind,
        from: ParticleId,
        to: ParticleId,
    ) -> Result<(ParticleId, ParticleId), PhysicsError> {
        let a = self
            .particles
            .get(from)
            .ok_or(PhysicsError::UnknownParticle(from))?;
        let b = self
            .particles
            .get(to)
            .ok_or(PhysicsError::UnknownParticle(to))?;
        if from == to {
            return Err(PhysicsError::SelfConnection(from));
        }

        let (from, to) = match kind {
            ConnectionKind::Spring { .. } => (from, to),
            ConnectionKind::Pendulum => match (a.anchored, b.anchored) {
                (true, _) => (from, to),
                (false, true) => (to, from),
                (false, false) => return Err(PhysicsError::PendulumWithoutAnchor),
            },
        };

        if kind.is_pendulum() {
            if let Some(constraint) = self.particles[to].constraint {
                return Err(PhysicsError::AlreadyConstrained {
                    bob: to,
                    arm: constraint.arm,
                });
            }
        }

        if self.particles[from].position == self.particles[to].position {
            return Err(PhysicsError::DegenerateGeometry { from, to });
        }

        Ok((from, to))
    }

    pub fn remove_connection(&mut self, id: ConnectionId) -> Result<(), PhysicsError> {
        if !self.connections.contains_key(id) {
            return Err(PhysicsError::UnknownConnection(id));
        }
        self.detach(id);
        self.compute_forces()
    }

    /// Drop a connection and release its bob, without recomputing forces
    fn detach(&mut self, id: ConnectionId) {
        let Some(connection) = self.connections.remove(id) else {
            return;
        };
        self.connection_order.retain(|&c| c != id);

        if connection.kind.is_pendulum() {
            if let Some(bob) = self.particles.get_mut(connection.to) {
                bob.constraint = None;
            }
        }
        ftlog::debug!("removed {:?} {id:?}", connection.kind);
    }

    /// Place a particle at `position` and bring it to rest
    ///
    /// A pendulum bob is projected back onto its arm's circle. Bobs hanging
    /// from a moved anchor follow it at their current angle. If the new
    /// position makes a connection degenerate the world is left unchanged.
    pub fn move_particle(&mut self, id: ParticleId, position: DVec2) -> Result<(), PhysicsError> {
        if !self.particles.contains_key(id) {
            return Err(PhysicsError::UnknownParticle(id));
        }
        let saved = self.particles.clone();

        let hanging = self
            .connections()
            .filter(|(_, c)| c.kind.is_pendulum() && c.from == id)
            .map(|(_, c)| (c.to, c.natural_length))
            .collect::<Vec<_>>();
        let old_anchor = self.particles[id].position;
        for &(bob, length) in &hanging {
            self.particles[bob].swing(old_anchor, length);
        }

        let pivot = self.pivot(id);
        let particle = &mut self.particles[id];
        particle.velocity = DVec2::ZERO;
        particle.position = match pivot {
            Some((anchor, length)) => {
                let state = AngularState::from_cartesian(position - anchor, DVec2::ZERO, length);
                if let Some(constraint) = particle.constraint.as_mut() {
                    constraint.angular = Some(state);
                }
                anchor + state.offset(length)
            }
            None => position,
        };
        let placed = particle.position;

        for (bob, length) in hanging {
            let bob = &mut self.particles[bob];
            if let Some(state) = bob.angular_state() {
                bob.position = placed + state.offset(length);
            }
        }

        if let Err(err) = self.compute_forces() {
            self.particles = saved;
            ftlog::warn!("rejected move of {id:?} to {position}: {err}");
            return Err(err);
        }
        ftlog::debug!("moved {id:?} to {position}");
        Ok(())
    }

    /// Anchor position and arm length for a pendulum bob
    pub(crate) fn pivot(&self, id: ParticleId) -> Option<(DVec2, f64)> {
        let constraint = self.particles.get(id)?.constraint?;
        let arm = self.connections.get(constraint.arm)?;
        Some((self.particles.get(arm.from)?.position, arm.natural_length))
    }
}
