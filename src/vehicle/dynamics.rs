/// The distance travelled in one tick at constant acceleration.
///
/// # Parameters
/// * `vel` - The velocity at the start of the tick
/// * `acc` - The acceleration during the tick
/// * `dt` - The time represented by one tick
pub fn displacement(vel: f64, acc: f64, dt: f64) -> f64 {
    vel * dt + 0.5 * acc * dt.powi(2)
}

/// The velocity at the end of a tick, clamped to `[0, max_vel]`.
pub fn next_velocity(vel: f64, acc: f64, dt: f64, max_vel: f64) -> f64 {
    (vel + acc * dt).clamp(0.0, max_vel)
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn integrates_one_tick() {
        assert_approx_eq!(displacement(0.5, -0.5, 1.0), 0.25);
        assert_approx_eq!(displacement(2.0, 0.1, 0.5), 1.0125);
        assert_approx_eq!(next_velocity(2.95, 0.1, 1.0, 3.0), 3.0);
        assert_approx_eq!(next_velocity(0.5, -0.5, 1.0, 3.0), 0.0);
        assert_approx_eq!(next_velocity(0.5, -2.0, 1.0, 3.0), 0.0);
    }
}
