use crate::{SignalId, VehicleId};

/// What a vehicle is reacting to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObstacleKind {
    /// The nearest vehicle ahead.
    Vehicle(VehicleId),
    /// A signal showing stop.
    Signal(SignalId),
}

/// Represents a vehicle or stopped signal
/// a vehicle may need to follow or stop before reaching.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    /// The kind of obstacle.
    pub kind: ObstacleKind,
    /// The forward separation to the obstacle.
    pub gap: f64,
    /// The velocity of the obstacle.
    pub vel: f64,
}

impl Obstacle {
    /// Returns the nearer of two obstacles. A signal wins a tie.
    pub fn nearer(self, other: Obstacle) -> Obstacle {
        match (self.kind, other.kind) {
            _ if self.gap < other.gap => self,
            _ if other.gap < self.gap => other,
            (ObstacleKind::Vehicle(_), ObstacleKind::Signal(_)) => other,
            _ => self,
        }
    }
}
