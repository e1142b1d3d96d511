use self::dynamics::{displacement, next_velocity};
use crate::error::DegenerateGap;
use crate::math::Vector2d;
use crate::obstacle::{Obstacle, ObstacleKind};
use crate::signal::SignalState;
use crate::space::Leader;
use crate::{SignalId, VehicleId};
use log::{trace, warn};

pub use self::acceleration::{AccelerationModel, ModelParams, MIN_GAP_EPSILON};

mod acceleration;
mod dynamics;

/// A simulated vehicle.
///
/// The vehicle's location is held by the [crate::RoadSpace]; this holds its kinematic state.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// The vehicle's ID
    pub(crate) id: VehicleId,
    /// The maximum speed.
    max_vel: f64,
    /// The separation below which the vehicle ahead is followed.
    follow_dist: f64,
    /// The separation below which a signal is obeyed.
    signal_dist: f64,
    /// The minimum gap kept to the vehicle ahead when overtaking is prevented.
    buffer: f64,
    /// A unit vector in the direction of travel.
    bearing: Vector2d,
    /// The acceleration model
    model: AccelerationModel,
    /// The velocity, always within `[0, max_vel]`.
    vel: f64,
    /// The acceleration applied during the last tick.
    acc: f64,
}

/// The attributes of a simulated vehicle.
#[derive(Clone, Copy, Debug)]
pub struct VehicleAttributes {
    /// The maximum speed, must be positive.
    pub max_speed: f64,
    /// The separation below which the vehicle ahead is followed.
    pub follow_distance: f64,
    /// The separation below which a signal is obeyed.
    pub signal_detection_distance: f64,
    /// The minimum gap kept to the vehicle ahead when overtaking is prevented.
    pub buffer_distance: f64,
    /// The speed at creation.
    pub initial_speed: f64,
    /// The direction of travel. Normalised on creation.
    pub bearing: Vector2d,
}

/// A signal as seen by an approaching vehicle.
#[derive(Clone, Copy, Debug)]
pub struct SignalSighting {
    pub id: SignalId,
    /// The forward separation to the signal; zero when level with it.
    pub distance: f64,
    pub state: SignalState,
}

/// The new state of a vehicle, computed from the state of the previous tick.
#[derive(Clone, Copy, Debug)]
pub struct VehicleUpdate {
    /// The vehicle being updated.
    pub id: VehicleId,
    /// The obstacle the vehicle reacted to, if any.
    pub obstacle: Option<Obstacle>,
    /// The acceleration applied during the tick.
    pub acc: f64,
    /// The velocity at the end of the tick.
    pub vel: f64,
    /// The distance to travel along the bearing.
    pub disp: f64,
    /// Set when the gap to the obstacle had to be substituted.
    pub degenerate: Option<DegenerateGap>,
}

impl Vehicle {
    /// Creates a new vehicle.
    pub(crate) fn new(id: VehicleId, attributes: &VehicleAttributes, params: &ModelParams) -> Self {
        use cgmath::InnerSpace;
        Self {
            id,
            max_vel: attributes.max_speed,
            follow_dist: attributes.follow_distance,
            signal_dist: attributes.signal_detection_distance,
            buffer: attributes.buffer_distance,
            bearing: attributes.bearing.normalize(),
            model: AccelerationModel::new(params),
            vel: attributes.initial_speed.clamp(0.0, attributes.max_speed),
            acc: 0.0,
        }
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// The vehicle's velocity.
    pub fn speed(&self) -> f64 {
        self.vel
    }

    /// The acceleration applied during the last tick.
    pub fn acc(&self) -> f64 {
        self.acc
    }

    pub fn max_speed(&self) -> f64 {
        self.max_vel
    }

    pub fn follow_distance(&self) -> f64 {
        self.follow_dist
    }

    pub fn signal_detection_distance(&self) -> f64 {
        self.signal_dist
    }

    pub fn buffer_distance(&self) -> f64 {
        self.buffer
    }

    /// A unit vector aligned with the vehicle's heading.
    pub fn bearing(&self) -> Vector2d {
        self.bearing
    }

    /// Whether the vehicle is at rest. Braking clamps the velocity to exactly zero.
    pub fn has_stopped(&self) -> bool {
        self.vel == 0.0
    }

    /// Picks the obstacle to react to: the vehicle ahead if it is within the follow distance,
    /// or a signal showing stop within the detection distance, whichever is nearer.
    ///
    /// A signal which shows pass, or which the vehicle has already passed, imposes nothing.
    ///
    /// # Parameters
    /// * `leader` - The nearest vehicle ahead and its velocity
    /// * `signals` - The signals ahead of the vehicle
    pub(crate) fn choose_obstacle(
        &self,
        leader: Option<(Leader, f64)>,
        signals: impl IntoIterator<Item = SignalSighting>,
    ) -> Option<Obstacle> {
        let vehicle = leader
            .filter(|(leader, _)| leader.gap < self.follow_dist)
            .map(|(leader, vel)| Obstacle {
                kind: ObstacleKind::Vehicle(leader.id),
                gap: leader.gap,
                vel,
            });

        signals
            .into_iter()
            .filter(|sig| sig.distance < self.signal_dist && sig.state == SignalState::Stop)
            .map(|sig| Obstacle {
                kind: ObstacleKind::Signal(sig.id),
                gap: sig.distance,
                vel: 0.0,
            })
            .chain(vehicle)
            .reduce(Obstacle::nearer)
    }

    /// Computes the vehicle's acceleration, displacement and velocity for one tick.
    ///
    /// The displacement uses the acceleration before the velocity is clamped, so a vehicle
    /// braking hard within a long tick may be moved backwards.
    ///
    /// # Parameters
    /// * `obstacle` - The obstacle to react to, if any
    /// * `dt` - The time represented by one tick
    pub(crate) fn plan(&self, obstacle: Option<Obstacle>, dt: f64) -> VehicleUpdate {
        let (acc, degenerate) = match obstacle {
            Some(obstacle) => self
                .model
                .follow_or_substitute(obstacle.gap, self.vel, obstacle.vel),
            None => (self.model.cruise(), None),
        };
        if let Some(degenerate) = degenerate {
            warn!("vehicle {:?}: {}", self.id, degenerate);
        }

        let disp = displacement(self.vel, acc, dt);
        let vel = next_velocity(self.vel, acc, dt, self.max_vel);
        trace!(
            "vehicle {:?}: obstacle {:?}, acc {:.3}, disp {:.3}, vel {:.3}",
            self.id,
            obstacle,
            acc,
            disp,
            vel
        );

        VehicleUpdate {
            id: self.id,
            obstacle,
            acc,
            vel,
            disp,
            degenerate,
        }
    }

    /// Limits a displacement so the vehicle stops `buffer_distance` short of the vehicle ahead
    /// rather than reaching or passing it.
    pub(crate) fn prevent_overtake(&self, disp: f64, leader: Option<Leader>) -> f64 {
        match leader {
            Some(leader) if disp >= leader.gap => f64::max(leader.gap - self.buffer, 0.0),
            _ => disp,
        }
    }

    /// The offset to move the vehicle by for the given displacement.
    pub(crate) fn offset(&self, disp: f64) -> Vector2d {
        self.bearing * disp
    }

    /// Commits a previously planned update.
    pub(crate) fn apply(&mut self, update: &VehicleUpdate) {
        debug_assert_eq!(update.id, self.id);
        self.acc = update.acc;
        self.vel = update.vel;
    }

    /// Overrides the vehicle's velocity, clamped to `[0, max_speed]`.
    pub(crate) fn set_speed(&mut self, vel: f64) {
        self.vel = vel.clamp(0.0, self.max_vel);
    }
}
