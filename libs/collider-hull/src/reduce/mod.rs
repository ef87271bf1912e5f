//! # Point Reduction
//!
//! Octree bucketing that shrinks a dense point cloud before hull
//! construction.
//!
//! The bounding box of the input is split into `2^L` cells per axis. Every
//! cell holding at least one input point contributes its eight corners, and
//! corners shared by neighbouring cells are collapsed. The result encloses
//! every input point, so its hull is a conservative, resolution-bounded
//! approximation of the exact hull that tightens as the level grows.
//!
//! ## Example
//!
//! ```rust
//! use collider_hull::reduce::{reduce, ReductionLevel};
//! use glam::DVec3;
//!
//! let points: Vec<DVec3> = (0..1000)
//!     .map(|i| DVec3::new((i % 10) as f64, ((i / 10) % 10) as f64, (i / 100) as f64))
//!     .collect();
//! let reduced = reduce(&points, ReductionLevel::new(1).unwrap()).unwrap();
//! assert_eq!(reduced.len(), 27);
//! ```

mod spatial_hash;


use crate::error::HullError;
use config::constants::{
    validate_reduction_level, DEFAULT_REDUCTION_LEVEL, REDUCTION_MERGE_DISTANCE, REDUCTION_PAD,
    REDUCTION_RELATIVE_PAD,
};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use spatial_hash::CornerSet;
use std::collections::HashSet;
use tracing::debug;

/// Octree depth of a reduction, in `1..=8`.
///
/// # Example
///
/// ```rust
/// use collider_hull::reduce::ReductionLevel;
///
/// assert_eq!(ReductionLevel::new(3).unwrap().cells_per_axis(), 8);
/// assert!(ReductionLevel::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ReductionLevel(u8);

impl ReductionLevel {
    pub fn new(level: u8) -> Result<Self, HullError> {
        validate_reduction_level(level)
            .map(Self)
            .map_err(|_| HullError::InvalidReductionLevel { level })
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Number of octree cells along each axis (`2^level`).
    #[inline]
    pub fn cells_per_axis(self) -> u32 {
        1 << self.0
    }
}

impl Default for ReductionLevel {
    fn default() -> Self {
        Self(DEFAULT_REDUCTION_LEVEL)
    }
}

impl TryFrom<u8> for ReductionLevel {
    type Error = HullError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<ReductionLevel> for u8 {
    fn from(level: ReductionLevel) -> Self {
        level.0
    }
}

/// Replaces `points` by the corners of the octree cells they occupy.
///
/// Corners come out cell by cell, in the order cells were first visited, and
/// each corner is kept only the first time it is emitted.
///
/// # Errors
///
/// Fails on empty input or a non-finite coordinate.
pub fn reduce(points: &[DVec3], level: ReductionLevel) -> Result<Vec<DVec3>, HullError> {
    if points.is_empty() {
        return Err(HullError::EmptyInput);
    }
    if let Some(index) = points.iter().position(|p| !p.is_finite()) {
        return Err(HullError::NonFiniteCoordinate { index });
    }

    let (min, max) = padded_bounds(points);
    let cells = level.cells_per_axis();
    let border = f64::from(cells - 1);
    let step = (max - min) / f64::from(cells);

    let mut visited = HashSet::new();
    let mut occupied = Vec::new();
    for &p in points {
        let cell = ((p - min) / step).clamp(DVec3::ZERO, DVec3::splat(border));
        let key = [cell.x as u32, cell.y as u32, cell.z as u32];
        if visited.insert(key) {
            occupied.push(key);
        }
    }

    // never merge two distinct corners of one cell
    let merge_distance = REDUCTION_MERGE_DISTANCE.min(0.5 * step.min_element());
    let mut seen = CornerSet::new(merge_distance, occupied.len() * 8);
    let mut reduced = Vec::with_capacity(occupied.len() * 8);
    for key in &occupied {
        for corner in cell_corners(min, step, *key) {
            if seen.insert(corner) {
                reduced.push(corner);
            }
        }
    }

    debug!(
        input = points.len(),
        level = level.get(),
        cells = occupied.len(),
        output = reduced.len(),
        "reduced point cloud"
    );
    Ok(reduced)
}

/// Bounding box of `points`, widened on any axis too thin to hold cells.
///
/// The pad grows with the coordinate magnitude so it survives rounding far
/// from the origin.
fn padded_bounds(points: &[DVec3]) -> (DVec3, DVec3) {
    let (mut min, mut max) = points
        .iter()
        .fold((points[0], points[0]), |(lo, hi), &p| (lo.min(p), hi.max(p)));

    for axis in 0..3 {
        let magnitude = min[axis].abs().max(max[axis].abs());
        let pad = REDUCTION_PAD.max(magnitude * REDUCTION_RELATIVE_PAD);
        if max[axis] - min[axis] < pad {
            min[axis] -= pad;
            max[axis] += pad;
        }
    }
    (min, max)
}

/// The eight corners of cell `key`, x varying fastest, then z, then y.
fn cell_corners(min: DVec3, step: DVec3, key: [u32; 3]) -> [DVec3; 8] {
    let lo = min + DVec3::new(f64::from(key[0]), f64::from(key[1]), f64::from(key[2])) * step;
    let hi = min + DVec3::new(
        f64::from(key[0] + 1),
        f64::from(key[1] + 1),
        f64::from(key[2] + 1),
    ) * step;

    [
        DVec3::new(lo.x, lo.y, lo.z),
        DVec3::new(hi.x, lo.y, lo.z),
        DVec3::new(lo.x, lo.y, hi.z),
        DVec3::new(hi.x, lo.y, hi.z),
        DVec3::new(lo.x, hi.y, lo.z),
        DVec3::new(hi.x, hi.y, lo.z),
        DVec3::new(lo.x, hi.y, hi.z),
        DVec3::new(hi.x, hi.y, hi.z),
    ]
}
