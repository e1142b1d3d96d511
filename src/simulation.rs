use crate::config::{NeighbourSearch, OvertakePolicy, ScenarioConfig, UpdateOrder};
use crate::error::{DegenerateGap, SimResult};
use crate::math::Point2d;
use crate::scenario;
use crate::signal::{Signal, SignalAttributes};
use crate::space::{AgentId, CellGrid, LinearScan, NearestAhead, RoadSpace};
use crate::vehicle::{SignalSighting, Vehicle, VehicleAttributes, VehicleUpdate};
use crate::{SignalId, SignalSet, VehicleId, VehicleSet};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// A traffic simulation on a wrap-around road.
///
/// Each call to [Self::step] advances one tick: due signals toggle first, then every
/// vehicle is updated exactly once. All vehicles decide from the state committed at the
/// end of the previous tick, and no vehicle moves until every decision has been made.
pub struct Simulation {
    /// The scenario parameters, fixed for the run.
    config: ScenarioConfig,
    /// The locations of all agents.
    space: RoadSpace,
    /// The vehicles being simulated.
    vehicles: VehicleSet,
    /// The traffic signals.
    signals: SignalSet,
    /// Answers nearest-vehicle-ahead queries.
    neighbours: Box<dyn NearestAhead>,
    /// Used for placement and shuffling.
    rng: StdRng,
    /// The last tick processed.
    tick: u64,
}

/// What happened during one tick.
#[derive(Clone, Debug, Default)]
pub struct StepReport {
    /// The tick that was processed.
    pub tick: u64,
    /// The signals which toggled.
    pub toggled: Vec<SignalId>,
    /// The vehicles whose gap to their obstacle was substituted.
    pub degenerate_gaps: Vec<(VehicleId, DegenerateGap)>,
}

impl Simulation {
    /// Creates an empty simulation. Fails if the configuration is invalid.
    pub fn new(config: &ScenarioConfig) -> SimResult<Self> {
        config.validate()?;
        let neighbours: Box<dyn NearestAhead> = match config.neighbour_search {
            NeighbourSearch::Scan => Box::new(LinearScan::default()),
            NeighbourSearch::Grid { cell_size } => Box::new(CellGrid::new(cell_size)),
        };
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config: config.clone(),
            space: RoadSpace::new(config.space_width, config.space_height),
            vehicles: VehicleSet::with_key(),
            signals: SignalSet::with_key(),
            neighbours,
            rng,
            tick: 0,
        })
    }

    /// Creates a simulation populated with randomly placed vehicles and one signal.
    pub fn from_scenario(config: &ScenarioConfig) -> SimResult<Self> {
        let mut sim = Self::new(config)?;
        scenario::populate(&mut sim)?;
        info!(
            "created scenario with {} vehicles and {} signals on a {}x{} road",
            sim.vehicles.len(),
            sim.signals.len(),
            config.space_width,
            config.space_height
        );
        Ok(sim)
    }

    /// Adds a vehicle to the simulation at the given location.
    pub fn add_vehicle(
        &mut self,
        attributes: &VehicleAttributes,
        location: Point2d,
    ) -> SimResult<VehicleId> {
        self.config.validate_vehicle(attributes)?;
        let params = self.config.model_params();
        let id = self
            .vehicles
            .insert_with_key(|id| Vehicle::new(id, attributes, &params));
        let location = self.space.move_to(AgentId::Vehicle(id), location);
        debug!("added vehicle {:?} at {:?}", id, location);
        Ok(id)
    }

    /// Adds a traffic signal to the simulation at the given location.
    pub fn add_signal(
        &mut self,
        attributes: &SignalAttributes,
        location: Point2d,
    ) -> SimResult<SignalId> {
        self.config.validate_signal(attributes)?;
        let id = self.signals.insert_with_key(|id| Signal::new(id, attributes));
        let location = self.space.move_to(AgentId::Signal(id), location);
        debug!("added signal {:?} at {:?}", id, location);
        Ok(id)
    }

    /// Advances the simulation by one tick.
    pub fn step(&mut self) -> StepReport {
        self.tick += 1;
        let toggled = self.update_signals();
        let updates = self.compute_updates();
        self.commit(&updates);

        let mut degenerate_gaps: Vec<_> = updates
            .iter()
            .filter_map(|update| update.degenerate.map(|d| (update.id, d)))
            .collect();
        degenerate_gaps.sort_by_key(|(id, _)| *id);

        StepReport {
            tick: self.tick,
            toggled,
            degenerate_gaps,
        }
    }

    /// Advances the simulation by `ticks` ticks.
    /// Returns the number of degenerate gaps encountered.
    pub fn run(&mut self, ticks: u64) -> usize {
        (0..ticks).map(|_| self.step().degenerate_gaps.len()).sum()
    }

    /// Gets the last tick processed; zero before the first step.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// The scenario parameters.
    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// The space holding every agent's location.
    pub fn space(&self) -> &RoadSpace {
        &self.space
    }

    /// Returns an iterator over all the vehicles in the simulation.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    /// Returns an iterator over all the signals in the simulation.
    pub fn iter_signals(&self) -> impl Iterator<Item = &Signal> {
        self.signals.values()
    }

    /// Gets a reference to the vehicle with the given ID.
    pub fn get_vehicle(&self, vehicle_id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(vehicle_id)
    }

    /// Gets a reference to the signal with the given ID.
    pub fn get_signal(&self, signal_id: SignalId) -> Option<&Signal> {
        self.signals.get(signal_id)
    }

    /// The location of the vehicle with the given ID.
    pub fn vehicle_position(&self, vehicle_id: VehicleId) -> Option<Point2d> {
        self.space.location(AgentId::Vehicle(vehicle_id))
    }

    /// The location of the signal with the given ID.
    pub fn signal_position(&self, signal_id: SignalId) -> Option<Point2d> {
        self.space.location(AgentId::Signal(signal_id))
    }

    /// The mean speed of all vehicles, or zero if there are none.
    pub fn mean_speed(&self) -> f64 {
        if self.vehicles.is_empty() {
            return 0.0;
        }
        self.iter_vehicles().map(Vehicle::speed).sum::<f64>() / self.vehicles.len() as f64
    }

    /// Overrides a vehicle's speed, e.g. to randomise initial conditions.
    pub(crate) fn set_vehicle_speed(&mut self, vehicle_id: VehicleId, speed: f64) {
        if let Some(vehicle) = self.vehicles.get_mut(vehicle_id) {
            vehicle.set_speed(speed);
        }
    }

    pub(crate) fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Toggles the signals which are due this tick.
    fn update_signals(&mut self) -> Vec<SignalId> {
        let tick = self.tick;
        self.signals
            .iter_mut()
            .filter(|(_, signal)| signal.is_due(tick))
            .map(|(id, signal)| {
                signal.toggle();
                debug!("tick {}: signal {:?} is now {:?}", tick, id, signal.state());
                id
            })
            .collect()
    }

    /// Decides every vehicle's update from the previous tick's state.
    fn compute_updates(&mut self) -> Vec<VehicleUpdate> {
        let locations: Vec<_> = self.space.vehicles().map(|(id, p)| (id, p.x)).collect();
        self.neighbours.rebuild(&locations, self.space.width());

        let mut order: Vec<_> = locations.iter().map(|(id, _)| *id).collect();
        match self.config.update_order {
            UpdateOrder::Fixed => order.sort_unstable(),
            UpdateOrder::Shuffled => order.shuffle(&mut self.rng),
        }

        order
            .into_iter()
            .filter_map(|id| self.compute_update(id))
            .collect()
    }

    /// Decides a single vehicle's update.
    fn compute_update(&self, id: VehicleId) -> Option<VehicleUpdate> {
        let vehicle = self.vehicles.get(id)?;
        let location = self.space.location(AgentId::Vehicle(id))?;

        let leader = self.neighbours.nearest_ahead(id, location.x);
        let leader_with_vel = leader.and_then(|leader| {
            self.vehicles
                .get(leader.id)
                .map(|other| (leader, other.speed()))
        });

        let sightings = self.space.signals().filter_map(|(sig_id, point)| {
            let signal = self.signals.get(sig_id)?;
            Some(SignalSighting {
                id: sig_id,
                distance: self.space.separation(location.x, point.x),
                state: signal.state(),
            })
        });

        let obstacle = vehicle.choose_obstacle(leader_with_vel, sightings);
        let mut update = vehicle.plan(obstacle, self.config.step_to_time_ratio);
        if self.config.overtake_policy == OvertakePolicy::Prevent {
            update.disp = vehicle.prevent_overtake(update.disp, leader);
        }
        Some(update)
    }

    /// Applies the computed updates and moves the vehicles.
    fn commit(&mut self, updates: &[VehicleUpdate]) {
        for update in updates {
            if let Some(vehicle) = self.vehicles.get_mut(update.id) {
                vehicle.apply(update);
                self.space
                    .move_by(AgentId::Vehicle(update.id), vehicle.offset(update.disp));
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::signal::SignalState;
    use assert_approx_eq::assert_approx_eq;

    fn config() -> ScenarioConfig {
        ScenarioConfig {
            signal_detection_distance: 10.0,
            update_order: UpdateOrder::Fixed,
            seed: Some(1),
            ..Default::default()
        }
    }

    fn stop_signal() -> SignalAttributes {
        SignalAttributes {
            initial_state: SignalState::Stop,
            toggle_period: 100,
            phase_offset: 0,
        }
    }

    #[test]
    fn vehicles_read_previous_tick() {
        let mut sim = Simulation::new(&config()).unwrap();
        let attributes = sim.config().vehicle_attributes();
        let back = sim.add_vehicle(&attributes, Point2d::new(10.0, 0.0)).unwrap();
        let front = sim.add_vehicle(&attributes, Point2d::new(15.0, 0.0)).unwrap();

        sim.step();
        // The front vehicle cruises, the back vehicle matched the front's old speed
        assert_approx_eq!(sim.get_vehicle(front).unwrap().speed(), 0.6);
        assert_approx_eq!(sim.get_vehicle(back).unwrap().speed(), 0.5);
        assert_approx_eq!(sim.get_vehicle(back).unwrap().acc(), 0.0);
        assert_approx_eq!(sim.vehicle_position(back).unwrap().x, 10.5);
        assert_approx_eq!(sim.vehicle_position(front).unwrap().x, 15.55);
    }

    #[test]
    fn order_does_not_change_outcome() {
        let run = |order| {
            let mut sim = Simulation::new(&ScenarioConfig {
                update_order: order,
                num_vehicles: 20,
                ..config()
            })
            .unwrap();
            scenario::populate(&mut sim).unwrap();
            sim.run(250);
            sim.space().vehicles().map(|(_, p)| p.x).collect::<Vec<_>>()
        };
        assert_eq!(run(UpdateOrder::Fixed), run(UpdateOrder::Shuffled));
    }

    #[test]
    fn degenerate_gaps_are_reported_in_id_order() {
        let run = |order| {
            let mut sim = Simulation::new(&ScenarioConfig {
                update_order: order,
                gap_exponent: 1.0,
                ..config()
            })
            .unwrap();
            let attributes = sim.config().vehicle_attributes();
            for x in [5.0, 17.0, 29.0, 41.0] {
                let location = Point2d::new(x, 0.0);
                sim.add_vehicle(&attributes, location).unwrap();
                sim.add_signal(&stop_signal(), location).unwrap();
            }
            sim.step().degenerate_gaps
        };
        let shuffled = run(UpdateOrder::Shuffled);
        assert_eq!(shuffled.len(), 4);
        assert!(shuffled.windows(2).all(|pair| pair[0].0 < pair[1].0));
        assert_eq!(shuffled, run(UpdateOrder::Fixed));
    }

    #[test]
    fn tiny_grid_cells_match_scan() {
        let run = |neighbour_search| {
            let mut sim = Simulation::new(&ScenarioConfig {
                neighbour_search,
                num_vehicles: 12,
                ..config()
            })
            .unwrap();
            scenario::populate(&mut sim).unwrap();
            sim.run(100);
            sim.space().vehicles().map(|(_, p)| p.x).collect::<Vec<_>>()
        };
        let grid = NeighbourSearch::Grid { cell_size: 1e-17 };
        assert_eq!(run(grid), run(NeighbourSearch::Scan));
    }

    #[test]
    fn signals_toggle_before_vehicles_move() {
        let mut sim = Simulation::new(&ScenarioConfig {
            signal_toggle_period: 2,
            ..config()
        })
        .unwrap();
        let sig = sim.add_signal(&stop_signal(), Point2d::new(30.0, 0.0)).unwrap();
        assert!(sim.step().toggled.is_empty());
        assert_eq!(sim.step().toggled, vec![sig]);
        assert_eq!(sim.get_signal(sig).unwrap().state(), SignalState::Pass);
    }

    #[test]
    fn overtake_prevention_stops_behind_leader() {
        let mut sim = Simulation::new(&ScenarioConfig {
            overtake_policy: OvertakePolicy::Prevent,
            ..config()
        })
        .unwrap();
        let attributes = VehicleAttributes {
            initial_speed: 3.0,
            ..sim.config().vehicle_attributes()
        };
        let back = sim.add_vehicle(&attributes, Point2d::new(10.0, 0.0)).unwrap();
        let front = sim.add_vehicle(&attributes, Point2d::new(12.5, 0.0)).unwrap();

        // Matching the front vehicle's speed would carry the back vehicle 3 units
        sim.step();
        assert_approx_eq!(sim.vehicle_position(back).unwrap().x, 10.5);
        assert_approx_eq!(sim.vehicle_position(front).unwrap().x, 15.55);
    }

    #[test]
    fn rejects_invalid_vehicle() {
        let mut sim = Simulation::new(&config()).unwrap();
        let attributes = VehicleAttributes {
            initial_speed: 5.0,
            ..sim.config().vehicle_attributes()
        };
        assert!(sim.add_vehicle(&attributes, Point2d::new(0.0, 0.0)).is_err());
        assert_eq!(sim.iter_vehicles().count(), 0);
    }
}
