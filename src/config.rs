//! Scenario parameters.

use crate::error::{ConfigError, SimResult};
use crate::signal::{SignalAttributes, SignalState};
use crate::vehicle::{ModelParams, VehicleAttributes};
use crate::math::Vector2d;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// How each vehicle finds the nearest vehicle ahead of it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NeighbourSearch {
    /// Compare against every other vehicle.
    Scan,
    /// Bucket vehicles into cells along the road and walk forward from the own cell.
    #[serde(rename_all = "camelCase")]
    Grid { cell_size: f64 },
}

/// The order in which vehicles are updated within a tick.
///
/// All vehicles read the previous tick's state, so the order never changes
/// the outcome of a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpdateOrder {
    /// Ascending vehicle ID.
    Fixed,
    /// A fresh random permutation every tick.
    Shuffled,
}

/// Whether a vehicle may drive past the vehicle ahead of it within one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OvertakePolicy {
    /// Displacement is never limited by the vehicle ahead.
    Allow,
    /// A vehicle that would reach the vehicle ahead stops `buffer_distance` behind it.
    Prevent,
}

/// The parameters of a simulation run. They are fixed for the run's duration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScenarioConfig {
    /// Number of vehicles placed by [crate::Simulation::from_scenario].
    pub num_vehicles: usize,
    /// The distance to the vehicle ahead below which a vehicle follows it.
    pub follow_distance: f64,
    /// The distance to a signal below which a vehicle obeys it.
    pub signal_detection_distance: f64,
    /// The minimum gap kept from an obstacle when overtaking is prevented.
    pub buffer_distance: f64,
    /// Maximum vehicle speed in distance units per time unit.
    pub max_speed: f64,
    /// The speed all vehicles start with.
    pub initial_speed: f64,
    /// Standard deviation of a normal spread applied to the initial speed.
    pub initial_speed_stddev: f64,
    /// Acceleration applied when there is no obstacle ahead.
    pub acceleration: f64,
    /// Optional bound on the magnitude of any computed acceleration.
    pub acceleration_limit: Option<f64>,
    /// Gain of the car following model.
    pub alpha: f64,
    /// Speed exponent of the car following model.
    pub speed_exponent: f64,
    /// Gap exponent of the car following model.
    pub gap_exponent: f64,
    pub space_width: f64,
    pub space_height: f64,
    /// Number of ticks between signal toggles.
    pub signal_toggle_period: u64,
    /// Tick from which the toggle period is counted.
    pub signal_phase_offset: u64,
    /// `true` if the signal starts in the pass state.
    pub signal_initial_state: bool,
    /// The amount of time represented by one tick.
    pub step_to_time_ratio: f64,
    pub neighbour_search: NeighbourSearch,
    pub update_order: UpdateOrder,
    pub overtake_policy: OvertakePolicy,
    /// Seed for placement and shuffling. Drawn from entropy when absent.
    pub seed: Option<u64>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            num_vehicles: 10,
            follow_distance: 10.0,
            signal_detection_distance: 5.0,
            buffer_distance: 2.0,
            max_speed: 3.0,
            initial_speed: 0.5,
            initial_speed_stddev: 0.0,
            acceleration: 0.1,
            acceleration_limit: None,
            alpha: 1.0,
            speed_exponent: 0.0,
            gap_exponent: 0.0,
            space_width: 50.0,
            space_height: 50.0,
            signal_toggle_period: 100,
            signal_phase_offset: 0,
            signal_initial_state: true,
            step_to_time_ratio: 1.0,
            neighbour_search: NeighbourSearch::Scan,
            update_order: UpdateOrder::Shuffled,
            overtake_policy: OvertakePolicy::Allow,
            seed: None,
        }
    }
}

impl ScenarioConfig {
    /// Parses a configuration from JSON. Missing fields take their default values.
    /// The result is validated.
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration from a JSON stream. The result is validated.
    pub fn from_reader(reader: impl Read) -> SimResult<Self> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// The largest distance a vehicle with the given maximum speed can travel in a single tick.
    pub fn max_displacement(&self, max_speed: f64) -> f64 {
        let dt = self.step_to_time_ratio;
        let acc = self.acceleration_limit.unwrap_or(0.0).max(self.acceleration);
        max_speed * dt + 0.5 * acc * dt * dt
    }

    /// The initial state of the scenario's signal.
    pub fn signal_state(&self) -> SignalState {
        SignalState::from(self.signal_initial_state)
    }

    /// The parameters of the car following model shared by all vehicles.
    pub fn model_params(&self) -> ModelParams {
        ModelParams {
            alpha: self.alpha,
            speed_exponent: self.speed_exponent,
            gap_exponent: self.gap_exponent,
            cruise_acceleration: self.acceleration,
            acceleration_limit: self.acceleration_limit,
        }
    }

    /// The attributes of the scenario's signal.
    pub fn signal_attributes(&self) -> SignalAttributes {
        SignalAttributes {
            initial_state: self.signal_state(),
            toggle_period: self.signal_toggle_period,
            phase_offset: self.signal_phase_offset,
        }
    }

    /// The attributes of a vehicle travelling in the positive x direction.
    pub fn vehicle_attributes(&self) -> VehicleAttributes {
        VehicleAttributes {
            max_speed: self.max_speed,
            follow_distance: self.follow_distance,
            signal_detection_distance: self.signal_detection_distance,
            buffer_distance: self.buffer_distance,
            initial_speed: self.initial_speed,
            bearing: Vector2d::new(1.0, 0.0),
        }
    }

    /// Checks that every parameter lies within its valid domain.
    pub fn validate(&self) -> SimResult<()> {
        positive("spaceWidth", self.space_width)?;
        positive("spaceHeight", self.space_height)?;
        positive("stepToTimeRatio", self.step_to_time_ratio)?;
        positive("acceleration", self.acceleration)?;
        non_negative("initialSpeedStddev", self.initial_speed_stddev)?;
        non_negative("alpha", self.alpha)?;
        non_negative("speedExponent", self.speed_exponent)?;
        non_negative("gapExponent", self.gap_exponent)?;
        if let Some(limit) = self.acceleration_limit {
            positive("accelerationLimit", limit)?;
        }
        self.validate_signal(&self.signal_attributes())?;
        if let NeighbourSearch::Grid { cell_size } = self.neighbour_search {
            positive("neighbourSearch.cellSize", cell_size)?;
        }
        self.validate_vehicle(&self.vehicle_attributes())
    }

    /// Checks that a vehicle's attributes suit this scenario.
    pub fn validate_vehicle(&self, attributes: &VehicleAttributes) -> SimResult<()> {
        positive("maxSpeed", attributes.max_speed)?;
        positive("followDistance", attributes.follow_distance)?;
        positive("signalDetectionDistance", attributes.signal_detection_distance)?;
        non_negative("bufferDistance", attributes.buffer_distance)?;
        if !(0.0..=attributes.max_speed).contains(&attributes.initial_speed) {
            return Err(ConfigError::out_of_range(
                "initialSpeed",
                "within [0, maxSpeed]",
                attributes.initial_speed,
            ));
        }
        let heading = attributes.bearing.x.hypot(attributes.bearing.y);
        positive("bearing", heading)?;

        let max_displacement = self.max_displacement(attributes.max_speed);
        if attributes.follow_distance <= max_displacement {
            return Err(ConfigError::FollowDistanceTooShort {
                follow_distance: attributes.follow_distance,
                max_displacement,
            });
        }
        if attributes.follow_distance >= self.space_width {
            return Err(ConfigError::out_of_range(
                "followDistance",
                "less than spaceWidth",
                attributes.follow_distance,
            ));
        }
        if attributes.signal_detection_distance >= self.space_width {
            return Err(ConfigError::out_of_range(
                "signalDetectionDistance",
                "less than spaceWidth",
                attributes.signal_detection_distance,
            ));
        }
        Ok(())
    }

    /// Checks that a signal's attributes are valid.
    pub fn validate_signal(&self, attributes: &SignalAttributes) -> SimResult<()> {
        if attributes.toggle_period == 0 {
            return Err(ConfigError::out_of_range("signalTogglePeriod", "positive", 0.0));
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> SimResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::out_of_range(name, "positive and finite", value))
    }
}

fn non_negative(name: &'static str, value: f64) -> SimResult<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::out_of_range(name, "non-negative and finite", value))
    }
}
