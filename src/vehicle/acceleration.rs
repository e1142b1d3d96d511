use crate::error::DegenerateGap;

/// The gap substituted when the gap to an obstacle is not positive.
pub const MIN_GAP_EPSILON: f64 = 1e-6;

/// The General Motors car following model:
///
/// `acc = alpha * v^m / gap^l * (v_obstacle - v)`
///
/// With the default `alpha = 1, m = 0, l = 0` this reduces to matching the obstacle's
/// speed within one time unit.
#[derive(Clone, Copy, Debug)]
pub struct AccelerationModel {
    alpha: f64,
    speed_exp: f64,
    gap_exp: f64,
    cruise_acc: f64,
    limit: Option<f64>,
}

/// The parameters of the acceleration model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelParams {
    /// The gain of the model.
    pub alpha: f64,
    /// The exponent applied to the vehicle's own speed.
    pub speed_exponent: f64,
    /// The exponent applied to the gap to the obstacle.
    pub gap_exponent: f64,
    /// The acceleration used when nothing is ahead.
    pub cruise_acceleration: f64,
    /// The maximum magnitude of any acceleration, if bounded.
    pub acceleration_limit: Option<f64>,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            speed_exponent: 0.0,
            gap_exponent: 0.0,
            cruise_acceleration: 0.1,
            acceleration_limit: None,
        }
    }
}

impl AccelerationModel {
    /// Creates a new acceleration model.
    pub fn new(params: &ModelParams) -> Self {
        AccelerationModel {
            alpha: params.alpha,
            speed_exp: params.speed_exponent,
            gap_exp: params.gap_exponent,
            cruise_acc: params.cruise_acceleration,
            limit: params.acceleration_limit,
        }
    }

    /// The acceleration of a vehicle with nothing ahead of it.
    pub fn cruise(&self) -> f64 {
        self.bound(self.cruise_acc)
    }

    /// Calculates the acceleration needed to follow an obstacle.
    ///
    /// # Arguments
    /// * `gap` - The forward separation to the obstacle, must be positive.
    /// * `my_vel` - The velocity of the simulated vehicle.
    /// * `their_vel` - The obstacle's velocity.
    pub fn follow(&self, gap: f64, my_vel: f64, their_vel: f64) -> Result<f64, DegenerateGap> {
        if gap.is_nan() || gap <= 0.0 {
            return Err(DegenerateGap {
                gap,
                substitute: MIN_GAP_EPSILON,
            });
        }
        let sensitivity = self.alpha * my_vel.powf(self.speed_exp) / gap.powf(self.gap_exp);
        Ok(self.bound(sensitivity * (their_vel - my_vel)))
    }

    /// Like [Self::follow], but a non-positive gap is replaced by [MIN_GAP_EPSILON].
    /// The substitution is returned alongside the acceleration so it can be reported.
    pub fn follow_or_substitute(
        &self,
        gap: f64,
        my_vel: f64,
        their_vel: f64,
    ) -> (f64, Option<DegenerateGap>) {
        match self.follow(gap, my_vel, their_vel) {
            Ok(acc) => (acc, None),
            Err(degenerate) => {
                let acc = self
                    .follow(degenerate.substitute, my_vel, their_vel)
                    .unwrap_or(0.0);
                (acc, Some(degenerate))
            }
        }
    }

    /// Applies the acceleration limit, if there is one.
    fn bound(&self, acc: f64) -> f64 {
        match self.limit {
            Some(limit) => acc.clamp(-limit, limit),
            None => acc,
        }
    }
}
