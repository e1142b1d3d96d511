//! A discrete-time traffic simulation on a closed, wrap-around road.
//!
//! Vehicles follow the nearest vehicle ahead using the General Motors car following
//! model, and brake for any traffic signal showing stop within their detection distance.

pub use cgmath;
pub use config::{NeighbourSearch, OvertakePolicy, ScenarioConfig, UpdateOrder};
pub use error::{ConfigError, DegenerateGap, SimResult};
pub use obstacle::{Obstacle, ObstacleKind};
pub use signal::{Signal, SignalAttributes, SignalState};
pub use simulation::{Simulation, StepReport};
pub use slotmap::{Key, KeyData};
pub use space::{AgentId, CellGrid, Leader, LinearScan, NearestAhead, RoadSpace};
pub use vehicle::{AccelerationModel, ModelParams, Vehicle, VehicleAttributes, MIN_GAP_EPSILON};
use slotmap::{new_key_type, SlotMap};

mod config;
mod error;
pub mod math;
mod obstacle;
mod scenario;
mod signal;
mod simulation;
mod space;
mod vehicle;

new_key_type! {
    /// Unique ID of a [Vehicle].
    pub struct VehicleId;
    /// Unique ID of a [Signal].
    pub struct SignalId;
}

type VehicleSet = SlotMap<VehicleId, Vehicle>;
type SignalSet = SlotMap<SignalId, Signal>;
