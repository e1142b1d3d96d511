use crate::math::{forward_distance, wrap, Point2d, Vector2d};
use crate::{SignalId, VehicleId};
use slotmap::SecondaryMap;

pub use self::search::{CellGrid, Leader, LinearScan, NearestAhead};

mod search;

/// Identifies any agent which occupies the road space.
///
/// The ordering (vehicles before signals, then by key) is the tie-break applied
/// whenever two agents are exactly the same distance away.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgentId {
    Vehicle(VehicleId),
    Signal(SignalId),
}

/// A bounded space which wraps around on both axes.
///
/// Vehicles travel along the x axis, which is the axis used for all separations.
/// The y coordinate only places agents across the road.
#[derive(Clone, Debug)]
pub struct RoadSpace {
    /// The extent of the x axis.
    width: f64,
    /// The extent of the y axis.
    height: f64,
    /// The locations of the vehicles.
    vehicles: SecondaryMap<VehicleId, Point2d>,
    /// The locations of the signals.
    signals: SecondaryMap<SignalId, Point2d>,
}

impl RoadSpace {
    /// Creates an empty space. Both dimensions must be positive.
    pub(crate) fn new(width: f64, height: f64) -> Self {
        debug_assert!(width > 0.0 && height > 0.0);
        Self {
            width,
            height,
            vehicles: SecondaryMap::new(),
            signals: SecondaryMap::new(),
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Wraps a point into `[0, width) × [0, height)`.
    pub fn wrap(&self, point: Point2d) -> Point2d {
        Point2d::new(wrap(point.x, self.width), wrap(point.y, self.height))
    }

    /// Gets the location of an agent, if it has been placed in the space.
    pub fn location(&self, agent: AgentId) -> Option<Point2d> {
        match agent {
            AgentId::Vehicle(id) => self.vehicles.get(id).copied(),
            AgentId::Signal(id) => self.signals.get(id).copied(),
        }
    }

    /// Places an agent at the given point, wrapping it into the space.
    pub(crate) fn move_to(&mut self, agent: AgentId, point: Point2d) -> Point2d {
        let point = self.wrap(point);
        match agent {
            AgentId::Vehicle(id) => self.vehicles.insert(id, point),
            AgentId::Signal(id) => self.signals.insert(id, point),
        };
        point
    }

    /// Moves an agent by the given offset from its current location.
    /// Returns the new location, or `None` if the agent is not in the space.
    pub(crate) fn move_by(&mut self, agent: AgentId, offset: Vector2d) -> Option<Point2d> {
        let point = self.location(agent)?;
        Some(self.move_to(agent, point + offset))
    }

    /// The separation from `from` to `to` in the direction of travel.
    /// Returns `None` if either agent is missing, or if `to` is not strictly ahead of `from`.
    pub fn distance_ahead(&self, from: AgentId, to: AgentId) -> Option<f64> {
        let from = self.location(from)?;
        let to = self.location(to)?;
        Some(self.separation(from.x, to.x)).filter(|sep| *sep > 0.0)
    }

    /// The separation from `from` to `to` along the x axis in the direction of travel.
    pub fn separation(&self, from: f64, to: f64) -> f64 {
        forward_distance(from, to, self.width)
    }

    /// Iterates over the vehicles and their locations.
    pub fn vehicles(&self) -> impl Iterator<Item = (VehicleId, Point2d)> + '_ {
        self.vehicles.iter().map(|(id, point)| (id, *point))
    }

    /// Iterates over the signals and their locations.
    pub fn signals(&self) -> impl Iterator<Item = (SignalId, Point2d)> + '_ {
        self.signals.iter().map(|(id, point)| (id, *point))
    }

    /// All agents in the space, ordered by ID.
    pub fn agents(&self) -> Vec<(AgentId, Point2d)> {
        let mut agents: Vec<_> = self
            .vehicles()
            .map(|(id, p)| (AgentId::Vehicle(id), p))
            .chain(self.signals().map(|(id, p)| (AgentId::Signal(id), p)))
            .collect();
        agents.sort_by_key(|(id, _)| *id);
        agents
    }

    /// The agents no further than `radius` ahead of `agent`, nearest first.
    ///
    /// Agents at exactly the same x coordinate are included with a separation of zero.
    /// Equal separations are ordered by [AgentId].
    pub fn objects_near(&self, agent: AgentId, radius: f64) -> Vec<(AgentId, f64)> {
        let Some(origin) = self.location(agent) else {
            return vec![];
        };
        let mut near: Vec<_> = self
            .agents()
            .into_iter()
            .filter(|(id, _)| *id != agent)
            .map(|(id, point)| (id, self.separation(origin.x, point.x)))
            .filter(|(_, sep)| *sep <= radius)
            .collect();
        near.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        near
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use slotmap::SlotMap;

    fn space_with(xs: &[f64]) -> (RoadSpace, Vec<VehicleId>) {
        let mut keys = SlotMap::<VehicleId, ()>::with_key();
        let mut space = RoadSpace::new(50.0, 1.0);
        let ids = xs
            .iter()
            .map(|x| {
                let id = keys.insert(());
                space.move_to(AgentId::Vehicle(id), Point2d::new(*x, 0.0));
                id
            })
            .collect();
        (space, ids)
    }

    #[test]
    fn move_wraps_position() {
        let (mut space, ids) = space_with(&[49.0]);
        let agent = AgentId::Vehicle(ids[0]);
        let p = space.move_by(agent, Vector2d::new(3.0, 0.0)).unwrap();
        assert_approx_eq!(p.x, 2.0);
        let p = space.move_to(agent, Point2d::new(-0.5, 1.5));
        assert_approx_eq!(p.x, 49.5);
        assert_approx_eq!(p.y, 0.5);
    }

    #[test]
    fn distance_ahead_handles_wrap() {
        let (space, ids) = space_with(&[45.0, 5.0, 45.0]);
        let [a, b, c] = [ids[0], ids[1], ids[2]].map(AgentId::Vehicle);
        assert_approx_eq!(space.distance_ahead(a, b).unwrap(), 10.0);
        assert_approx_eq!(space.distance_ahead(b, a).unwrap(), 40.0);
        assert_eq!(space.distance_ahead(a, c), None);
    }

    #[test]
    fn objects_near_sorted_by_separation() {
        let (space, ids) = space_with(&[10.0, 14.0, 12.0, 30.0, 12.0]);
        let near = space.objects_near(AgentId::Vehicle(ids[0]), 5.0);
        let got: Vec<_> = near.iter().map(|(id, _)| *id).collect();
        assert_eq!(
            got,
            vec![
                AgentId::Vehicle(ids[2]),
                AgentId::Vehicle(ids[4]),
                AgentId::Vehicle(ids[1]),
            ]
        );
    }
}
