//! # Batch Builds
//!
//! Independent collider hulls for many point sets at once.
//!
//! Each input gets its own arena, so builds share no mutable state and run
//! in parallel on the rayon thread pool. A failing input yields an `Err` in
//! its slot without affecting the others.

use crate::error::HullError;
use crate::hull::Hull;
use crate::reduce::ReductionLevel;
use crate::collider_hull;
use glam::DVec3;
use rayon::prelude::*;
use tracing::debug;

/// Builds one collider hull per input, in input order.
///
/// # Example
///
/// ```rust
/// use collider_hull::batch::build_colliders;
/// use glam::DVec3;
///
/// let tetra = vec![DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z];
/// let results = build_colliders(&[tetra.clone(), vec![DVec3::ZERO], tetra], None);
/// assert!(results[0].is_ok());
/// assert!(results[1].is_err());
/// assert!(results[2].is_ok());
/// ```
pub fn build_colliders<P>(inputs: &[P], level: Option<ReductionLevel>) -> Vec<Result<Hull, HullError>>
where
    P: AsRef<[DVec3]> + Sync,
{
    let results: Vec<Result<Hull, HullError>> = inputs
        .par_iter()
        .map(|points| collider_hull(points.as_ref(), level))
        .collect();

    let failed = results.iter().filter(|r| r.is_err()).count();
    debug!(inputs = inputs.len(), failed, "batch colliders built");
    results
}
