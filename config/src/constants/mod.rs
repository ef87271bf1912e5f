//! Centralized configuration values shared by the hull builder and the point
//! reducer.
//!
//! Each public item documents its purpose and a minimal usage example so that
//! the geometry crate can stay declarative and avoid scattering literals.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// TOLERANCE CONSTANTS
// =============================================================================

/// Multiplier applied to machine epsilon and the summed coordinate extents
/// when the hull tolerance is derived automatically.
///
/// # Examples
/// ```
/// use config::constants::AUTOMATIC_TOLERANCE_FACTOR;
/// let extents = 3.0;
/// let tolerance = AUTOMATIC_TOLERANCE_FACTOR * f64::EPSILON * extents;
/// assert!(tolerance > 0.0);
/// ```
pub const AUTOMATIC_TOLERANCE_FACTOR: f64 = 3.0;

/// Multiple of the tolerance below which the initial simplex is rejected as
/// collinear or coplanar.
///
/// # Examples
/// ```
/// use config::constants::DEGENERACY_FACTOR;
/// assert!(DEGENERACY_FACTOR > 1.0);
/// ```
pub const DEGENERACY_FACTOR: f64 = 100.0;

/// Once an unclaimed point is this many tolerances outside a new face, the
/// search for a better face stops early.
///
/// # Examples
/// ```
/// use config::constants::UNCLAIMED_EARLY_EXIT_FACTOR;
/// assert!(UNCLAIMED_EARLY_EXIT_FACTOR >= 100.0);
/// ```
pub const UNCLAIMED_EARLY_EXIT_FACTOR: f64 = 1000.0;

/// Scales `char_length * f64::EPSILON` into the minimum face area used when
/// triangulating; faces below it get their normal rebuilt from the longest
/// edge.
///
/// # Examples
/// ```
/// use config::constants::TRIANGULATE_MIN_AREA_FACTOR;
/// let min_area = TRIANGULATE_MIN_AREA_FACTOR * 2.0 * f64::EPSILON;
/// assert!(min_area > 0.0);
/// ```
pub const TRIANGULATE_MIN_AREA_FACTOR: f64 = 1000.0;

/// Multiple of the tolerance a point may sit outside a finished face before
/// hull verification reports it.
pub const POINT_CHECK_FACTOR: f64 = 10.0;

/// Minimum number of points a hull can be built from.
pub const MIN_HULL_POINTS: usize = 4;

// =============================================================================
// REDUCTION CONSTANTS
// =============================================================================

/// Smallest accepted octree reduction level (`2^1` cells per axis).
pub const MIN_REDUCTION_LEVEL: u8 = 1;

/// Largest accepted octree reduction level (`2^8` cells per axis).
pub const MAX_REDUCTION_LEVEL: u8 = 8;

/// Reduction level used when callers do not choose one.
///
/// # Examples
/// ```
/// use config::constants::{DEFAULT_REDUCTION_LEVEL, MAX_REDUCTION_LEVEL, MIN_REDUCTION_LEVEL};
/// assert!((MIN_REDUCTION_LEVEL..=MAX_REDUCTION_LEVEL).contains(&DEFAULT_REDUCTION_LEVEL));
/// ```
pub const DEFAULT_REDUCTION_LEVEL: u8 = 3;

/// Padding added to each side of a flat bounding-box axis so octree cells
/// never collapse to zero size.
pub const REDUCTION_PAD: f64 = 1.0e-4;

/// Pad of a flat axis relative to its coordinate magnitude. Far from the
/// origin the absolute [`REDUCTION_PAD`] rounds away, so the larger of the
/// two is used.
///
/// # Examples
/// ```
/// use config::constants::{REDUCTION_PAD, REDUCTION_RELATIVE_PAD};
/// let far = 1.0e13_f64;
/// let pad = REDUCTION_PAD.max(far * REDUCTION_RELATIVE_PAD);
/// assert!(far + pad > far);
/// ```
pub const REDUCTION_RELATIVE_PAD: f64 = 1.0e-9;

/// Distance under which two emitted cell corners are treated as the same
/// point.
///
/// This is a plain Euclidean distance, capped at half the cell step by the
/// reducer. It deliberately differs from comparing the squared distance
/// against `1e-4`, which merges corners up to `1e-2` apart and can fuse
/// distinct corners of fine cells on small inputs.
///
/// # Examples
/// ```
/// use config::constants::REDUCTION_MERGE_DISTANCE;
///
/// fn corners_merge(a: [f64; 3], b: [f64; 3]) -> bool {
///     let dx = a[0] - b[0];
///     let dy = a[1] - b[1];
///     let dz = a[2] - b[2];
///     (dx * dx + dy * dy + dz * dz).sqrt() < REDUCTION_MERGE_DISTANCE
/// }
///
/// assert!(corners_merge([0.0; 3], [0.0, 0.0, 1.0e-5]));
/// ```
pub const REDUCTION_MERGE_DISTANCE: f64 = 1.0e-4;

// =============================================================================
// MESH EXPORT CONSTANTS
// =============================================================================

/// Twice-area below which an exported triangle counts as degenerate.
pub const DEGENERATE_TRIANGLE_AREA: f64 = 1.0e-12;

// =============================================================================
// HULL CONFIG
// =============================================================================

/// How the distance tolerance of a hull build is chosen.
///
/// # Examples
/// ```
/// use config::constants::Tolerance;
/// assert_eq!(Tolerance::default(), Tolerance::Automatic);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Tolerance {
    /// Derived from the coordinate magnitudes of the input.
    #[default]
    Automatic,
    /// Fixed by the caller.
    Explicit(f64),
}

/// Immutable snapshot of the settings for one hull build.
///
/// # Examples
/// ```
/// use config::constants::HullConfig;
/// let config = HullConfig::default();
/// assert!(!config.triangulate);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawHullConfig")]
pub struct HullConfig {
    /// Distance tolerance used by every outside/inside test.
    pub tolerance: Tolerance,
    /// Fan-triangulate polygonal faces once the hull is finished.
    pub triangulate: bool,
}

impl HullConfig {
    /// Builds a configuration, rejecting an explicit tolerance that is not a
    /// finite positive number.
    ///
    /// # Examples
    /// ```
    /// use config::constants::{HullConfig, Tolerance};
    /// let cfg = HullConfig::new(Tolerance::Explicit(1.0e-6), true).expect("valid config");
    /// assert!(cfg.triangulate);
    /// assert!(HullConfig::new(Tolerance::Explicit(-1.0), false).is_err());
    /// ```
    pub fn new(tolerance: Tolerance, triangulate: bool) -> Result<Self, ConfigError> {
        if let Tolerance::Explicit(value) = tolerance {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidTolerance(value));
            }
        }
        Ok(Self {
            tolerance,
            triangulate,
        })
    }

    /// Returns a copy with an explicit tolerance.
    pub fn with_tolerance(self, tolerance: f64) -> Result<Self, ConfigError> {
        Self::new(Tolerance::Explicit(tolerance), self.triangulate)
    }

    /// Re-checks a snapshot that may have been built as a struct literal.
    ///
    /// # Examples
    /// ```
    /// use config::constants::{HullConfig, Tolerance};
    /// let cfg = HullConfig { tolerance: Tolerance::Explicit(-1.0), triangulate: false };
    /// assert!(cfg.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::new(self.tolerance, self.triangulate).map(|_| ())
    }
}

/// Unchecked wire form of [`HullConfig`]; deserialization goes through
/// [`HullConfig::new`].
#[derive(Deserialize)]
struct RawHullConfig {
    #[serde(default)]
    tolerance: Tolerance,
    #[serde(default)]
    triangulate: bool,
}

impl TryFrom<RawHullConfig> for HullConfig {
    type Error = ConfigError;

    fn try_from(raw: RawHullConfig) -> Result<Self, Self::Error> {
        Self::new(raw.tolerance, raw.triangulate)
    }
}

/// Checks a requested reduction level against the accepted range.
///
/// # Examples
/// ```
/// use config::constants::validate_reduction_level;
/// assert_eq!(validate_reduction_level(3), Ok(3));
/// assert!(validate_reduction_level(0).is_err());
/// assert!(validate_reduction_level(9).is_err());
/// ```
pub fn validate_reduction_level(level: u8) -> Result<u8, ConfigError> {
    if (MIN_REDUCTION_LEVEL..=MAX_REDUCTION_LEVEL).contains(&level) {
        Ok(level)
    } else {
        Err(ConfigError::InvalidReductionLevel(level))
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// Raised when an explicit tolerance is zero, negative or not finite.
    #[error("tolerance must be a finite positive number: {0}")]
    InvalidTolerance(f64),
    /// Raised when the reduction level is outside `1..=8`.
    #[error("reduction level must be in 1..=8: {0}")]
    InvalidReductionLevel(u8),
}

#[cfg(test)]
mod tests;
