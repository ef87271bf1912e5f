//! Tests for the hull configuration snapshot.

use super::*;

#[test]
fn default_config_is_automatic() {
    let cfg = HullConfig::default();
    assert_eq!(cfg.tolerance, Tolerance::Automatic);
    assert!(!cfg.triangulate);
}

#[test]
fn new_validates_explicit_tolerance() {
    assert_eq!(
        HullConfig::new(Tolerance::Explicit(0.0), false).unwrap_err(),
        ConfigError::InvalidTolerance(0.0)
    );
    assert!(HullConfig::new(Tolerance::Explicit(f64::NAN), false).is_err());
    assert!(HullConfig::new(Tolerance::Explicit(f64::INFINITY), false).is_err());
    assert!(HullConfig::new(Tolerance::Explicit(1.0e-9), false).is_ok());
}

#[test]
fn with_tolerance_keeps_triangulate_flag() {
    let cfg = HullConfig::new(Tolerance::Automatic, true)
        .unwrap()
        .with_tolerance(1.0e-5)
        .unwrap();
    assert!(cfg.triangulate);
    assert_eq!(cfg.tolerance, Tolerance::Explicit(1.0e-5));
}

#[test]
fn reduction_level_bounds() {
    for level in MIN_REDUCTION_LEVEL..=MAX_REDUCTION_LEVEL {
        assert_eq!(validate_reduction_level(level), Ok(level));
    }
    assert_eq!(
        validate_reduction_level(0),
        Err(ConfigError::InvalidReductionLevel(0))
    );
    assert_eq!(
        validate_reduction_level(MAX_REDUCTION_LEVEL + 1),
        Err(ConfigError::InvalidReductionLevel(MAX_REDUCTION_LEVEL + 1))
    );
}

#[test]
fn config_round_trips_through_json() {
    let cfg = HullConfig::new(Tolerance::Explicit(2.5e-6), true).unwrap();
    let json = serde_json::to_string(&cfg).unwrap();
    let back: HullConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(cfg, back);
}

#[test]
fn error_messages_name_the_value() {
    let msg = ConfigError::InvalidReductionLevel(12).to_string();
    assert!(msg.contains("12"));
    assert!(msg.contains("1..=8"));
}

#[test]
fn deserialize_rejects_invalid_tolerance() {
    let json = r#"{"tolerance":{"Explicit":-0.5},"triangulate":false}"#;
    let err = serde_json::from_str::<HullConfig>(json).unwrap_err();
    assert!(err.to_string().contains("-0.5"));
    assert!(serde_json::from_str::<HullConfig>(r#"{"tolerance":{"Explicit":0.0}}"#).is_err());
}

#[test]
fn deserialize_fills_defaults() {
    let cfg: HullConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg, HullConfig::default());
}

#[test]
fn validate_catches_struct_literals() {
    let bad = HullConfig {
        tolerance: Tolerance::Explicit(f64::NEG_INFINITY),
        triangulate: true,
    };
    assert_eq!(
        bad.validate(),
        Err(ConfigError::InvalidTolerance(f64::NEG_INFINITY))
    );
    assert_eq!(HullConfig::default().validate(), Ok(()));
}
