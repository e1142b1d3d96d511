//! Random initial placement of a scenario's agents.

use crate::error::{ConfigError, SimResult};
use crate::math::Point2d;
use crate::Simulation;
use rand_distr::{Distribution, Normal};

/// Places the scenario's vehicles and its signal.
///
/// Vehicles occupy distinct integer x coordinates sampled from `0..width` without
/// replacement, and are added in descending x order half way up the space.
/// The signal sits three quarters of the way along and up the space.
pub(crate) fn populate(sim: &mut Simulation) -> SimResult<()> {
    let config = sim.config().clone();
    let slots = config.space_width.floor() as usize;
    let rows = config.space_height.floor() as usize;
    if config.num_vehicles > slots {
        return Err(ConfigError::TooManyVehicles {
            requested: config.num_vehicles,
            slots,
        });
    }

    let mut xs = rand::seq::index::sample(sim.rng(), slots, config.num_vehicles).into_vec();
    xs.sort_unstable_by(|a, b| b.cmp(a));

    // Spread the initial speeds when requested
    let spread = if config.initial_speed_stddev > 0.0 {
        let distr = Normal::new(config.initial_speed, config.initial_speed_stddev).map_err(|_| {
            ConfigError::out_of_range(
                "initialSpeedStddev",
                "a valid standard deviation",
                config.initial_speed_stddev,
            )
        })?;
        Some(distr)
    } else {
        None
    };

    let attributes = config.vehicle_attributes();
    let y = (rows / 2) as f64;
    for x in xs {
        let id = sim.add_vehicle(&attributes, Point2d::new(x as f64, y))?;
        if let Some(distr) = &spread {
            let speed = distr.sample(sim.rng());
            sim.set_vehicle_speed(id, speed);
        }
    }

    let signal_at = Point2d::new((slots / 4 * 3) as f64, (rows / 4 * 3) as f64);
    sim.add_signal(&config.signal_attributes(), signal_at)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use crate::{ScenarioConfig, Simulation};
    use assert_approx_eq::assert_approx_eq;
    use itertools::Itertools;

    #[test]
    fn places_vehicles_on_distinct_slots() {
        let config = ScenarioConfig {
            num_vehicles: 30,
            seed: Some(42),
            ..Default::default()
        };
        let sim = Simulation::from_scenario(&config).unwrap();
        let xs: Vec<f64> = sim.space().vehicles().map(|(_, p)| p.x).collect();
        assert_eq!(xs.len(), 30);
        assert!(xs.iter().all(|x| x.fract() == 0.0 && *x < 50.0));
        assert_eq!(xs.iter().map(|x| *x as i64).unique().count(), 30);
        // Inserted in descending order
        assert!(xs.windows(2).all(|w| w[0] > w[1]));
        assert!(sim.space().vehicles().all(|(_, p)| p.y == 25.0));

        let (_, signal_at) = sim.space().signals().exactly_one().ok().unwrap();
        assert_approx_eq!(signal_at.x, 36.0);
        assert_approx_eq!(signal_at.y, 36.0);
    }

    #[test]
    fn same_seed_same_placement() {
        let config = ScenarioConfig {
            num_vehicles: 12,
            initial_speed_stddev: 0.3,
            seed: Some(3),
            ..Default::default()
        };
        let a = Simulation::from_scenario(&config).unwrap();
        let b = Simulation::from_scenario(&config).unwrap();
        let state = |sim: &Simulation| {
            sim.iter_vehicles()
                .map(|v| (sim.vehicle_position(v.id()).unwrap().x, v.speed()))
                .collect::<Vec<_>>()
        };
        assert_eq!(state(&a), state(&b));
        assert!(a.iter_vehicles().all(|v| (0.0..=3.0).contains(&v.speed())));
    }

    #[test]
    fn rejects_more_vehicles_than_slots() {
        let config = ScenarioConfig {
            num_vehicles: 51,
            ..Default::default()
        };
        assert!(Simulation::from_scenario(&config).is_err());
    }
}
