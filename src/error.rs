//! Error types.
//!
//! Setup problems are reported as [ConfigError] and are fatal: a simulation is never
//! constructed from an invalid scenario. A [DegenerateGap] is only ever a warning,
//! the run carries on with a substituted gap.

use thiserror::Error;

/// A scenario parameter lies outside its valid domain.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be {requirement}, got {value}")]
    OutOfRange {
        name: &'static str,
        requirement: &'static str,
        value: f64,
    },

    #[error(
        "followDistance {follow_distance} must exceed the maximum distance \
         travelled in one tick ({max_displacement})"
    )]
    FollowDistanceTooShort {
        follow_distance: f64,
        max_displacement: f64,
    },

    #[error("cannot place {requested} vehicles on {slots} distinct integer positions")]
    TooManyVehicles { requested: usize, slots: usize },

    #[error("failed to parse scenario configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn out_of_range(name: &'static str, requirement: &'static str, value: f64) -> Self {
        ConfigError::OutOfRange {
            name,
            requirement,
            value,
        }
    }
}

/// The forward gap to an obstacle was zero or negative, so the car following model
/// would divide by zero.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("non-positive gap {gap} to obstacle, substituted {substitute}")]
pub struct DegenerateGap {
    /// The gap that was observed.
    pub gap: f64,
    /// The gap that was used instead.
    pub substitute: f64,
}

/// Shorthand result type for setup operations.
pub type SimResult<T> = Result<T, ConfigError>;
