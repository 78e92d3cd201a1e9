use approx::assert_relative_eq;
use heparin_nomogram::{
    evaluate, evaluate_input, ConcentrationOption, NomogramError, OutputFormat, PatientInput,
    ProtocolType, Report, Severity,
};

#[test]
fn test_high_intensity_standard_concentration_scenario() {
    let rec = evaluate(
        ProtocolType::HighIntensity,
        ConcentrationOption::Standard,
        70.0,
        20.0,
        30.0,
    )
    .unwrap();

    assert_relative_eq!(rec.bolus_units, 5600.0);
    assert_relative_eq!(rec.bolus_volume_ml, 56.0);
    assert_relative_eq!(rec.rate_change_units_per_hr, 280.0);
    assert_relative_eq!(rec.rate_change_ml, 2.8);
    assert_relative_eq!(rec.new_rate_ml_per_hr, 22.8, epsilon = 1e-9);
    assert_eq!(rec.severity, Severity::High);
}

#[test]
fn test_low_intensity_concentrate_scenario() {
    let input = PatientInput::new(65.0, 10.0, 80.0);
    let rec = evaluate_input(
        ProtocolType::StandardLowIntensity,
        ConcentrationOption::Concentrate,
        &input,
    )
    .unwrap();

    assert_eq!(rec.bolus_units, 0.0);
    assert_relative_eq!(rec.rate_change_units_per_hr, -200.0);
    assert_relative_eq!(rec.rate_change_ml, -0.4);
    assert_relative_eq!(rec.new_rate_ml_per_hr, 9.6, epsilon = 1e-9);
    assert_eq!(rec.severity, Severity::Medium);
}

#[test]
fn test_hold_infusion_scenario_renders_instruction() {
    let input = PatientInput::new(60.0, 5.0, 100.0);
    let rec = evaluate_input(ProtocolType::HighIntensity, ConcentrationOption::Standard, &input)
        .unwrap();

    assert_relative_eq!(rec.rate_change_units_per_hr, -180.0);
    assert_relative_eq!(rec.rate_change_ml, -1.8);
    assert_relative_eq!(rec.new_rate_ml_per_hr, 3.2, epsilon = 1e-9);
    assert_eq!(rec.severity, Severity::High);

    let text = Report::new(
        ProtocolType::HighIntensity,
        ConcentrationOption::Standard,
        input,
        rec,
    )
    .render(OutputFormat::Text)
    .unwrap();

    assert!(text.contains("3.2 ml/hr (-1.8 ml/hr)"));
    assert!(text.contains("Hold infusion for 60 min"));
}

#[test]
fn test_clamped_rate_scenario() {
    let rec = evaluate(
        ProtocolType::HighIntensity,
        ConcentrationOption::Standard,
        50.0,
        0.5,
        95.0,
    )
    .unwrap();

    assert_relative_eq!(rec.rate_change_ml, -1.5);
    assert_eq!(rec.new_rate_ml_per_hr, 0.0);
    assert!(rec.rate_clamped);
}

#[test]
fn test_invalid_input_returns_no_recommendation() {
    let err = evaluate(
        ProtocolType::StandardLowIntensity,
        ConcentrationOption::Standard,
        70.0,
        -2.0,
        60.0,
    )
    .unwrap_err();

    assert!(matches!(err, NomogramError::InvalidInput { ref field, .. } if field == "current_rate_ml_per_hr"));
    assert!(!err.recovery_suggestion().is_empty());
}
