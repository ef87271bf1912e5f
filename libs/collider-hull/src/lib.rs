//! # Collider Hull
//!
//! Convex hulls for mesh colliders.
//! Turns a raw point cloud into a closed, outward-oriented convex polyhedron.
//!
//! ## Architecture
//!
//! ```text
//! points → reduce (optional octree corners) → hull (QuickHull) → faces / Mesh
//! ```
//!
//! ## Algorithms
//!
//! - **Reduction**: occupied octree cells replaced by their eight corners
//! - **Hull**: incremental QuickHull with horizon search and face merging
//! - **Topology**: index-based half-edge arena
//!
//! ## Usage
//!
//! ```rust
//! use collider_hull::{collider_hull, ReductionLevel};
//! use glam::DVec3;
//!
//! let points = vec![
//!     DVec3::new(0.0, 0.0, 0.0),
//!     DVec3::new(1.0, 0.0, 0.0),
//!     DVec3::new(0.0, 1.0, 0.0),
//!     DVec3::new(0.0, 0.0, 1.0),
//!     DVec3::new(0.2, 0.2, 0.2),
//! ];
//! let hull = collider_hull(&points, None).unwrap();
//! assert_eq!(hull.vertex_count(), 4);
//!
//! let coarse = collider_hull(&points, Some(ReductionLevel::new(2).unwrap())).unwrap();
//! assert!(coarse.face_count() >= 4);
//! ```

pub mod batch;
pub mod error;
pub mod halfedge;
pub mod hull;
pub mod mesh;
pub mod reduce;

pub use batch::build_colliders;
pub use config::{HullConfig, Tolerance};
pub use error::HullError;
pub use hull::{build_hull, FaceFlags, Hull, HullBuilder};
pub use mesh::Mesh;
pub use reduce::{reduce, ReductionLevel};

use glam::DVec3;
use tracing::debug;

/// Point type used across the crate.
pub type Point = DVec3;

/// Builds the collider hull of `points`, reducing them first when a level
/// is given.
///
/// This is the main entry point for collider generation. Without a level
/// the hull is exact up to tolerance. With one it is a conservative hull of
/// octree cell corners that still encloses every input point.
///
/// # Errors
///
/// Any [`HullError`] from reduction or hull construction.
///
/// # Example
///
/// ```rust
/// use collider_hull::collider_hull;
/// use glam::DVec3;
///
/// let err = collider_hull(&[DVec3::ZERO; 4], None).unwrap_err();
/// assert_eq!(err, collider_hull::HullError::CoincidentPoints);
/// ```
pub fn collider_hull(points: &[DVec3], level: Option<ReductionLevel>) -> Result<Hull, HullError> {
    collider_hull_with(points, level, HullConfig::default())
}

/// Like [`collider_hull`], with an explicit build configuration.
pub fn collider_hull_with(
    points: &[DVec3],
    level: Option<ReductionLevel>,
    config: HullConfig,
) -> Result<Hull, HullError> {
    let hull = match level {
        Some(level) => HullBuilder::new(config).build(&reduce(points, level)?)?,
        None => HullBuilder::new(config).build(points)?,
    };

    debug!(
        input = points.len(),
        level = level.map(ReductionLevel::get),
        vertices = hull.vertex_count(),
        faces = hull.face_count(),
        "collider hull built"
    );
    Ok(hull)
}
