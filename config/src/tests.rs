//! # Tests for Config Constants
//!
//! Sanity checks on the relationships between the numeric constants.

use crate::constants::*;

// =============================================================================
// TOLERANCE TESTS
// =============================================================================

#[test]
fn test_automatic_tolerance_factor_is_positive() {
    assert!(AUTOMATIC_TOLERANCE_FACTOR > 0.0);
}

#[test]
fn test_degeneracy_factor_exceeds_tolerance() {
    // Simplex rejection must be stricter than the plain outside test
    assert!(DEGENERACY_FACTOR > 1.0);
}

#[test]
fn test_early_exit_beyond_degeneracy() {
    assert!(UNCLAIMED_EARLY_EXIT_FACTOR > DEGENERACY_FACTOR);
}

#[test]
fn test_point_check_factor_is_loose() {
    assert!(POINT_CHECK_FACTOR >= 1.0);
}

#[test]
fn test_min_hull_points_is_tetrahedron() {
    assert_eq!(MIN_HULL_POINTS, 4);
}

// =============================================================================
// REDUCTION TESTS
// =============================================================================

#[test]
fn test_reduction_levels_ordered() {
    assert!(MIN_REDUCTION_LEVEL >= 1);
    assert!(MIN_REDUCTION_LEVEL <= DEFAULT_REDUCTION_LEVEL);
    assert!(DEFAULT_REDUCTION_LEVEL <= MAX_REDUCTION_LEVEL);
}

#[test]
fn test_max_level_fits_cell_index() {
    // 2^8 cells per axis still indexes in a u32 with room for corners
    assert!(1u32 << MAX_REDUCTION_LEVEL < u32::MAX);
}

#[test]
fn test_merge_distance_small() {
    assert!(REDUCTION_MERGE_DISTANCE > 0.0);
    assert!(REDUCTION_MERGE_DISTANCE <= 1.0e-3);
    assert!(REDUCTION_PAD > 0.0);
}
