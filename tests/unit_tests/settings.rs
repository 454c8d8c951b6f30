use fenris_eigenstrain::quadrature::CoordinateSystem;
use fenris_eigenstrain::settings::{AccumulationMode, FallbackPolicy, LeastSquaresWeighting, ReducerSettings};

#[test]
fn settings_defaults() {
    let settings = ReducerSettings::new(["thermal"]);
    assert_eq!(settings.input_eigenstrain_names, vec!["thermal".to_string()]);
    assert_eq!(settings.base_name, "");
    assert_eq!(settings.accumulation, AccumulationMode::Total);
    assert_eq!(settings.dimension, 3);
    assert!(!settings.second_order);
    assert_eq!(settings.weighting, LeastSquaresWeighting::Unweighted);
    assert_eq!(settings.fallback, FallbackPolicy::Fail);
    assert_eq!(settings.num_fit_columns(), 4);
    assert_eq!(settings.min_total_weight, f64::MIN_POSITIVE);
    assert!(settings.validate().is_ok());
}

#[test]
fn settings_from_json_use_defaults_for_missing_fields() {
    let json = r#"{
        "input_eigenstrain_names": ["thermal_eigenstrain", "phase_eigenstrain"],
        "accumulation": "incremental",
        "second_order": true,
        "weighting": "quadrature_weighted",
        "fallback": "volume_average"
    }"#;
    let settings: ReducerSettings = serde_json::from_str(json).unwrap();
    let expected = ReducerSettings::new(["thermal_eigenstrain", "phase_eigenstrain"])
        .with_accumulation(AccumulationMode::Incremental)
        .with_second_order(true)
        .with_weighting(LeastSquaresWeighting::QuadratureWeighted)
        .with_fallback(FallbackPolicy::VolumeAverage);
    assert_eq!(settings, expected);
}

#[test]
fn settings_survive_json_round_trip() {
    let settings = ReducerSettings::new(["a", "b"])
        .with_base_name("block1_")
        .with_dimension(2)
        .with_min_total_weight(0.25)
        .with_max_condition_number(1e8);
    let json = serde_json::to_string(&settings).unwrap();
    let deserialized: ReducerSettings = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized, settings);

    let system: CoordinateSystem = serde_json::from_str(r#""axisymmetric""#).unwrap();
    assert_eq!(system, CoordinateSystem::Axisymmetric);
}

#[test]
fn unknown_enum_values_are_rejected() {
    let json = r#"{ "input_eigenstrain_names": ["a"], "accumulation": "partial" }"#;
    assert!(serde_json::from_str::<ReducerSettings>(json).is_err());
}
