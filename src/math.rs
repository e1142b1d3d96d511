//! Mathematical types and functions.

use cgmath::{Point2, Vector2};

/// A 2D point
pub type Point2d = Point2<f64>;

/// A 2D vector
pub type Vector2d = Vector2<f64>;

/// Wraps `value` into the half-open interval `[0, bound)`.
///
/// # Parameters
/// * `value` - The coordinate to wrap
/// * `bound` - The extent of the axis, must be positive
pub fn wrap(value: f64, bound: f64) -> f64 {
    let wrapped = value.rem_euclid(bound);
    // `rem_euclid` rounds tiny negative values up to `bound`
    if wrapped >= bound {
        0.0
    } else {
        wrapped
    }
}

/// Computes the separation travelling in the positive direction from `from` to `to`
/// along an axis of length `bound` which wraps around.
/// The result lies in `[0, bound)`; zero means the two coordinates coincide.
pub fn forward_distance(from: f64, to: f64, bound: f64) -> f64 {
    let diff = to - from;
    if diff < 0.0 {
        wrap(diff + bound, bound)
    } else {
        wrap(diff, bound)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn wrap_into_range() {
        assert_approx_eq!(wrap(52.0, 50.0), 2.0);
        assert_approx_eq!(wrap(-1.0, 50.0), 49.0);
        assert_approx_eq!(wrap(50.0, 50.0), 0.0);
        assert_eq!(wrap(-1e-18, 50.0), 0.0);
    }

    #[test]
    fn forward_distance_wraps() {
        assert_approx_eq!(forward_distance(40.0, 45.0, 50.0), 5.0);
        assert_approx_eq!(forward_distance(45.0, 40.0, 50.0), 45.0);
        assert_approx_eq!(forward_distance(49.0, 2.0, 50.0), 3.0);
        assert_eq!(forward_distance(12.5, 12.5, 50.0), 0.0);
    }
}
