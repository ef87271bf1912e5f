//! # Config Crate
//!
//! Centralized configuration for the collider hull pipeline. Every numeric
//! factor used by the hull builder and the point reducer is defined here so
//! the geometry crates stay free of scattered literals.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{HullConfig, Tolerance, DEFAULT_REDUCTION_LEVEL};
//!
//! let cfg = HullConfig::default();
//! assert_eq!(cfg.tolerance, Tolerance::Automatic);
//! assert!(DEFAULT_REDUCTION_LEVEL >= 1);
//! ```
//!
//! ## Categories
//!
//! - **Tolerance**: factors deriving the hull distance tolerance
//! - **Reduction**: octree level limits and corner merge distance
//! - **Snapshots**: [`constants::HullConfig`] validated build settings

pub mod constants;

pub use constants::{ConfigError, HullConfig, Tolerance};

#[cfg(test)]
mod tests;
