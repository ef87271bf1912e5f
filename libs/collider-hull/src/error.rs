//! # Hull Errors
//!
//! Error types for point reduction and hull construction.

use config::ConfigError;
use thiserror::Error;

/// Errors that can occur while reducing points or building a hull.
///
/// Every variant is fatal for the build that produced it. Degenerate input
/// variants describe the caller's data; [`HullError::InternalConsistency`]
/// means a topology invariant broke and signals a defect.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HullError {
    /// No points were supplied
    #[error("Empty input: at least one point is required")]
    EmptyInput,

    /// Fewer points than a tetrahedron needs
    #[error("Too few points: {count} (min: 4)")]
    TooFewPoints { count: usize },

    /// A coordinate is NaN or infinite
    #[error("Non-finite coordinate at input point {index}")]
    NonFiniteCoordinate { index: usize },

    /// Every point lies within tolerance of a single position
    #[error("Input points appear to be coincident")]
    CoincidentPoints,

    /// Every point lies within tolerance of a single line
    #[error("Input points appear to be collinear (max distance {distance:e}, tolerance {tolerance:e})")]
    CollinearPoints { distance: f64, tolerance: f64 },

    /// Every point lies within tolerance of a single plane
    #[error("Input points appear to be coplanar (max distance {distance:e}, tolerance {tolerance:e})")]
    CoplanarPoints { distance: f64, tolerance: f64 },

    /// A half-edge topology invariant was violated
    #[error("Internal consistency violation: {message}")]
    InternalConsistency { message: String },

    /// Reduction level outside `1..=8`
    #[error("Invalid reduction level: {level} (expected 1..=8)")]
    InvalidReductionLevel { level: u8 },

    /// Invalid build configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl HullError {
    /// Creates an internal consistency error.
    pub fn consistency(message: impl Into<String>) -> Self {
        Self::InternalConsistency {
            message: message.into(),
        }
    }

    /// Returns true when the error reports a broken invariant rather than
    /// unusable input.
    pub fn is_defect(&self) -> bool {
        matches!(self, Self::InternalConsistency { .. })
    }
}
