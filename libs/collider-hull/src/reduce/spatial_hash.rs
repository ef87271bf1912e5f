//! Corner dedup for the octree reducer.
//!
//! Neighbouring cells emit the same lattice corner, computed with the same
//! arithmetic, so most repeats are exact. The merge radius also catches the
//! few that differ by rounding. Corners are bucketed on a grid whose bucket
//! edge is twice the radius, so any match lies in the 3x3x3 block around a
//! corner's own bucket.

use glam::DVec3;
use std::collections::HashMap;

type Bucket = (i64, i64, i64);

/// Emitted corners, bucketed for neighbourhood lookups.
pub(crate) struct CornerSet {
    buckets: HashMap<Bucket, Vec<DVec3>>,
    bucket_size: f64,
    merge_distance_sq: f64,
}

impl CornerSet {
    /// `merge_distance` must stay below half the smallest cell step so two
    /// corners of one cell never collapse.
    pub(crate) fn new(merge_distance: f64, expected: usize) -> Self {
        Self {
            buckets: HashMap::with_capacity(expected),
            bucket_size: merge_distance * 2.0,
            merge_distance_sq: merge_distance * merge_distance,
        }
    }

    fn bucket(&self, p: DVec3) -> Bucket {
        let b = (p / self.bucket_size).floor();
        (b.x as i64, b.y as i64, b.z as i64)
    }

    fn contains_near(&self, corner: DVec3) -> bool {
        let (bx, by, bz) = self.bucket(corner);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(stored) = self.buckets.get(&(bx + dx, by + dy, bz + dz)) else {
                        continue;
                    };
                    if stored
                        .iter()
                        .any(|&s| s.distance_squared(corner) < self.merge_distance_sq)
                    {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Records `corner` unless an earlier corner lies within the merge
    /// distance. Returns true for a new corner.
    pub(crate) fn insert(&mut self, corner: DVec3) -> bool {
        if self.contains_near(corner) {
            return false;
        }
        let key = self.bucket(corner);
        self.buckets.entry(key).or_default().push(corner);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_corner_of_neighbour_cells_is_kept_once() {
        let step = 0.25;
        let mut corners = CornerSet::new(1e-4, 16);
        // hi corner of cell 2 and lo corner of cell 3 on the x axis
        let hi = DVec3::new(-1.0 + 3.0 * step, 0.0, 0.0);
        let lo = DVec3::new(-1.0, 0.0, 0.0) + DVec3::new(3.0, 0.0, 0.0) * step;
        assert!(corners.insert(hi));
        assert!(!corners.insert(lo));
    }

    #[test]
    fn test_rounding_noise_merges_across_buckets() {
        let mut corners = CornerSet::new(1e-4, 4);
        // straddles the bucket boundary at 2e-4
        assert!(corners.insert(DVec3::new(1.99e-4, -3.0, 5.0)));
        assert!(!corners.insert(DVec3::new(2.01e-4, -3.0, 5.0)));
    }

    #[test]
    fn test_corners_of_a_tiny_cell_stay_distinct() {
        let step = DVec3::splat(1e-5);
        let mut corners = CornerSet::new(0.5 * step.min_element(), 8);
        let lo = DVec3::new(-0.3, 0.7, 0.0);
        for i in 0..8 {
            let offset = DVec3::new((i & 1) as f64, ((i >> 1) & 1) as f64, ((i >> 2) & 1) as f64);
            assert!(corners.insert(lo + offset * step), "corner {i} merged");
        }
    }

    #[test]
    fn test_far_from_origin() {
        let mut corners = CornerSet::new(1e-4, 4);
        let far = DVec3::new(1.0e9, -1.0e9, 4.0);
        assert!(corners.insert(far));
        assert!(!corners.insert(far));
        assert!(corners.insert(far + DVec3::X));
    }
}
