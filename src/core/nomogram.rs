use crate::domain::model::{
    ConcentrationOption, PatientInput, ProtocolType, Recommendation, Severity,
};
use crate::utils::error::Result;
use crate::utils::validation::{validate_derived, validate_non_negative, validate_positive};

/// PTT 區間上界
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PttBound {
    /// ptt < value
    Below(f64),
    /// ptt <= value
    Through(f64),
    Unbounded,
}

impl PttBound {
    pub fn admits(self, ptt: f64) -> bool {
        match self {
            PttBound::Below(limit) => ptt < limit,
            PttBound::Through(limit) => ptt <= limit,
            PttBound::Unbounded => true,
        }
    }
}

/// 劑量：依體重 (units/kg) 或固定 (units)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dose {
    PerKg(f64),
    Fixed(f64),
}

impl Dose {
    pub fn units(self, weight_kg: f64) -> f64 {
        match self {
            Dose::PerKg(per_kg) => per_kg * weight_kg,
            Dose::Fixed(units) => units,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NomogramRule {
    pub upper: PttBound,
    pub bolus: Dose,
    pub rate_change: Dose,
    pub message: &'static str,
    pub severity: Severity,
    pub hold_minutes: Option<u32>,
}

pub const HIGH_INTENSITY_RULES: &[NomogramRule] = &[
    NomogramRule {
        upper: PttBound::Below(35.0),
        bolus: Dose::PerKg(80.0),
        rate_change: Dose::PerKg(4.0),
        message: "PTT sub-therapeutic",
        severity: Severity::High,
        hold_minutes: None,
    },
    NomogramRule {
        upper: PttBound::Below(50.0),
        bolus: Dose::PerKg(40.0),
        rate_change: Dose::PerKg(2.0),
        message: "PTT below target",
        severity: Severity::Medium,
        hold_minutes: None,
    },
    NomogramRule {
        upper: PttBound::Through(70.0),
        bolus: Dose::PerKg(0.0),
        rate_change: Dose::PerKg(0.0),
        message: "PTT in target range (therapeutic goal)",
        severity: Severity::Low,
        hold_minutes: None,
    },
    NomogramRule {
        upper: PttBound::Through(90.0),
        bolus: Dose::PerKg(0.0),
        rate_change: Dose::PerKg(-2.0),
        message: "PTT trending high",
        severity: Severity::Medium,
        hold_minutes: None,
    },
    NomogramRule {
        upper: PttBound::Unbounded,
        bolus: Dose::PerKg(0.0),
        rate_change: Dose::PerKg(-3.0),
        message: "PTT above target: hold infusion 60 min, then reduce rate",
        severity: Severity::High,
        hold_minutes: Some(60),
    },
];

// 只有三個區間，>70 不再細分
pub const STANDARD_LOW_INTENSITY_RULES: &[NomogramRule] = &[
    NomogramRule {
        upper: PttBound::Below(35.0),
        bolus: Dose::Fixed(5000.0),
        rate_change: Dose::Fixed(200.0),
        message: "PTT sub-therapeutic",
        severity: Severity::High,
        hold_minutes: None,
    },
    NomogramRule {
        upper: PttBound::Through(70.0),
        bolus: Dose::Fixed(0.0),
        rate_change: Dose::Fixed(0.0),
        message: "PTT in range: keep current rate",
        severity: Severity::Low,
        hold_minutes: None,
    },
    NomogramRule {
        upper: PttBound::Unbounded,
        bolus: Dose::Fixed(0.0),
        rate_change: Dose::Fixed(-200.0),
        message: "PTT elevated: reduce rate",
        severity: Severity::Medium,
        hold_minutes: None,
    },
];

pub fn rules_for(protocol: ProtocolType) -> &'static [NomogramRule] {
    match protocol {
        ProtocolType::HighIntensity => HIGH_INTENSITY_RULES,
        ProtocolType::StandardLowIntensity => STANDARD_LOW_INTENSITY_RULES,
    }
}

/// 找出第一個涵蓋此 PTT 的規則；每張表最後一列都是 Unbounded
pub fn lookup_rule(protocol: ProtocolType, ptt: f64) -> &'static NomogramRule {
    let rules = rules_for(protocol);
    rules
        .iter()
        .find(|rule| rule.upper.admits(ptt))
        .unwrap_or(&rules[rules.len() - 1])
}

/// Evaluate the nomogram for one patient.
///
/// Rejects a non-positive weight, a negative rate or PTT, and any non-finite
/// value with `NomogramError::InvalidInput`. Dose terms are converted to ml by
/// dividing by the selected concentration; the new rate is clamped at 0.
pub fn evaluate(
    protocol: ProtocolType,
    concentration: ConcentrationOption,
    weight_kg: f64,
    current_rate_ml_per_hr: f64,
    ptt: f64,
) -> Result<Recommendation> {
    validate_positive("weight_kg", weight_kg)?;
    validate_non_negative("current_rate_ml_per_hr", current_rate_ml_per_hr)?;
    validate_non_negative("ptt", ptt)?;

    let rule = lookup_rule(protocol, ptt);
    let units_per_ml = concentration.units_per_ml();

    let bolus_units = rule.bolus.units(weight_kg);
    let rate_change_units_per_hr = rule.rate_change.units(weight_kg);

    validate_derived("weight_kg", weight_kg, &[bolus_units, rate_change_units_per_hr])?;

    let bolus_volume_ml = bolus_units / units_per_ml;
    let rate_change_ml = rate_change_units_per_hr / units_per_ml;
    let raw_new_rate = current_rate_ml_per_hr + rate_change_ml;
    let current_dose_units_per_hr = current_rate_ml_per_hr * units_per_ml;

    validate_derived(
        "current_rate_ml_per_hr",
        current_rate_ml_per_hr,
        &[raw_new_rate, current_dose_units_per_hr],
    )?;

    let rate_clamped = raw_new_rate < 0.0;
    let new_rate_ml_per_hr = raw_new_rate.max(0.0);

    tracing::debug!(
        %protocol,
        %concentration,
        weight_kg,
        ptt,
        severity = %rule.severity,
        bolus_units,
        rate_change_units_per_hr,
        new_rate_ml_per_hr,
        "nomogram evaluated"
    );

    Ok(Recommendation {
        action_message: rule.message.to_string(),
        severity: rule.severity,
        bolus_units,
        rate_change_units_per_hr,
        bolus_volume_ml,
        rate_change_ml,
        new_rate_ml_per_hr,
        rate_clamped,
        hold_infusion_minutes: rule.hold_minutes,
        current_dose_units_per_hr,
    })
}

pub fn evaluate_input(
    protocol: ProtocolType,
    concentration: ConcentrationOption,
    input: &PatientInput,
) -> Result<Recommendation> {
    evaluate(
        protocol,
        concentration,
        input.weight_kg,
        input.current_rate_ml_per_hr,
        input.ptt_seconds,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::NomogramError;
    use approx::assert_relative_eq;

    const HIGH: ProtocolType = ProtocolType::HighIntensity;
    const LOW: ProtocolType = ProtocolType::StandardLowIntensity;
    const STD: ConcentrationOption = ConcentrationOption::Standard;
    const CONC: ConcentrationOption = ConcentrationOption::Concentrate;

    #[test]
    fn test_high_intensity_sub_therapeutic_scales_with_weight() {
        for weight in [0.5, 1.0, 42.0, 70.0, 150.3] {
            let rec = evaluate(HIGH, STD, weight, 10.0, 20.0).unwrap();
            assert_relative_eq!(rec.bolus_units, 80.0 * weight);
            assert_relative_eq!(rec.rate_change_units_per_hr, 4.0 * weight);
            assert_eq!(rec.severity, Severity::High);
        }
    }

    #[test]
    fn test_ptt_35_belongs_to_second_bucket() {
        let rec = evaluate(HIGH, STD, 80.0, 10.0, 35.0).unwrap();
        assert_relative_eq!(rec.bolus_units, 40.0 * 80.0);
        assert_eq!(rec.severity, Severity::Medium);

        let rec = evaluate(HIGH, STD, 80.0, 10.0, 34.99).unwrap();
        assert_relative_eq!(rec.bolus_units, 80.0 * 80.0);
    }

    #[test]
    fn test_ptt_49_and_50_boundary() {
        let rec = evaluate(HIGH, STD, 60.0, 10.0, 49.0).unwrap();
        assert_relative_eq!(rec.bolus_units, 2400.0);
        assert_eq!(rec.severity, Severity::Medium);

        let rec = evaluate(HIGH, STD, 60.0, 10.0, 50.0).unwrap();
        assert_eq!(rec.bolus_units, 0.0);
        assert_eq!(rec.rate_change_units_per_hr, 0.0);
        assert_eq!(rec.severity, Severity::Low);
    }

    #[test]
    fn test_fractional_ptt_has_no_gap() {
        assert_eq!(evaluate(HIGH, STD, 60.0, 10.0, 49.5).unwrap().severity, Severity::Medium);
        assert_eq!(evaluate(HIGH, STD, 60.0, 10.0, 70.0).unwrap().severity, Severity::Low);

        let rec = evaluate(HIGH, STD, 60.0, 10.0, 70.5).unwrap();
        assert_relative_eq!(rec.rate_change_units_per_hr, -120.0);
        assert_eq!(rec.severity, Severity::Medium);

        let rec = evaluate(HIGH, STD, 60.0, 10.0, 90.0).unwrap();
        assert_eq!(rec.hold_infusion_minutes, None);
        let rec = evaluate(HIGH, STD, 60.0, 10.0, 90.1).unwrap();
        assert_eq!(rec.hold_infusion_minutes, Some(60));
    }

    #[test]
    fn test_low_intensity_buckets() {
        let rec = evaluate(LOW, STD, 70.0, 10.0, 34.0).unwrap();
        assert_eq!(rec.bolus_units, 5000.0);
        assert_eq!(rec.rate_change_units_per_hr, 200.0);
        assert_eq!(rec.severity, Severity::High);

        let rec = evaluate(LOW, STD, 70.0, 10.0, 70.0).unwrap();
        assert_eq!(rec.rate_change_units_per_hr, 0.0);
        assert_eq!(rec.severity, Severity::Low);

        // >70 只有一個區間
        for ptt in [70.5, 91.0, 150.0] {
            let rec = evaluate(LOW, STD, 70.0, 10.0, ptt).unwrap();
            assert_eq!(rec.rate_change_units_per_hr, -200.0);
            assert_eq!(rec.severity, Severity::Medium);
            assert_eq!(rec.hold_infusion_minutes, None);
        }
    }

    #[test]
    fn test_low_intensity_ignores_weight() {
        let light = evaluate(LOW, STD, 40.0, 10.0, 20.0).unwrap();
        let heavy = evaluate(LOW, STD, 120.0, 10.0, 20.0).unwrap();
        assert_eq!(light, heavy);
    }

    #[test]
    fn test_scenario_high_intensity_sub_therapeutic() {
        let rec = evaluate(HIGH, STD, 70.0, 20.0, 30.0).unwrap();
        assert_relative_eq!(rec.bolus_units, 5600.0);
        assert_relative_eq!(rec.bolus_volume_ml, 56.0);
        assert_relative_eq!(rec.rate_change_units_per_hr, 280.0);
        assert_relative_eq!(rec.rate_change_ml, 2.8);
        assert_relative_eq!(rec.new_rate_ml_per_hr, 22.8, epsilon = 1e-9);
        assert_eq!(rec.severity, Severity::High);
        assert_relative_eq!(rec.current_dose_units_per_hr, 2000.0);
    }

    #[test]
    fn test_scenario_low_intensity_elevated() {
        let rec = evaluate(LOW, CONC, 70.0, 10.0, 80.0).unwrap();
        assert_eq!(rec.bolus_units, 0.0);
        assert_relative_eq!(rec.rate_change_units_per_hr, -200.0);
        assert_relative_eq!(rec.rate_change_ml, -0.4);
        assert_relative_eq!(rec.new_rate_ml_per_hr, 9.6, epsilon = 1e-9);
        assert_eq!(rec.severity, Severity::Medium);
    }

    #[test]
    fn test_scenario_hold_infusion() {
        let rec = evaluate(HIGH, STD, 60.0, 5.0, 100.0).unwrap();
        assert_relative_eq!(rec.rate_change_units_per_hr, -180.0);
        assert_relative_eq!(rec.rate_change_ml, -1.8);
        assert_relative_eq!(rec.new_rate_ml_per_hr, 3.2, epsilon = 1e-9);
        assert_eq!(rec.severity, Severity::High);
        assert_eq!(rec.hold_infusion_minutes, Some(60));
        assert!(rec.action_message.contains("hold infusion"));
    }

    #[test]
    fn test_scenario_clamped_rate() {
        let rec = evaluate(HIGH, STD, 50.0, 0.5, 95.0).unwrap();
        assert_relative_eq!(rec.rate_change_ml, -1.5);
        assert_eq!(rec.new_rate_ml_per_hr, 0.0);
        assert!(rec.rate_clamped);
    }

    #[test]
    fn test_unclamped_rate_is_not_flagged() {
        let rec = evaluate(HIGH, STD, 60.0, 5.0, 100.0).unwrap();
        assert!(!rec.rate_clamped);
        let rec = evaluate(LOW, STD, 70.0, 0.0, 60.0).unwrap();
        assert!(!rec.rate_clamped);
    }

    #[test]
    fn test_rejects_weight_that_overflows_dose() {
        match evaluate(HIGH, STD, 1e307, 10.0, 20.0) {
            Err(NomogramError::InvalidInput { field, .. }) => assert_eq!(field, "weight_kg"),
            other => panic!("expected InvalidInput for weight_kg, got {:?}", other),
        }
        // 固定劑量不依體重，不會溢位
        assert!(evaluate(LOW, STD, 1e307, 10.0, 20.0).is_ok());
    }

    #[test]
    fn test_rejects_rate_that_overflows_current_dose() {
        match evaluate(HIGH, CONC, 70.0, 1e307, 60.0) {
            Err(NomogramError::InvalidInput { field, .. }) => {
                assert_eq!(field, "current_rate_ml_per_hr")
            }
            other => panic!("expected InvalidInput for current_rate_ml_per_hr, got {:?}", other),
        }
    }

    #[test]
    fn test_new_rate_never_negative() {
        for protocol in [HIGH, LOW] {
            for concentration in [STD, CONC] {
                for ptt in [0.0, 34.0, 35.0, 49.0, 50.0, 70.0, 71.0, 90.0, 95.0, 200.0] {
                    for rate in [0.0, 0.1, 1.0, 25.0] {
                        let rec = evaluate(protocol, concentration, 120.0, rate, ptt).unwrap();
                        assert!(rec.new_rate_ml_per_hr >= 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_bolus_volume_converts_back_to_units() {
        for concentration in [STD, CONC] {
            let rec = evaluate(HIGH, concentration, 73.4, 12.0, 20.0).unwrap();
            assert_relative_eq!(
                rec.bolus_volume_ml * concentration.units_per_ml(),
                rec.bolus_units,
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let input = PatientInput::new(82.5, 14.2, 62.0);
        let first = evaluate_input(HIGH, CONC, &input).unwrap();
        let second = evaluate_input(HIGH, CONC, &input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rejects_invalid_input() {
        let cases = [
            (-70.0, 10.0, 50.0, "weight_kg"),
            (0.0, 10.0, 50.0, "weight_kg"),
            (70.0, -1.0, 50.0, "current_rate_ml_per_hr"),
            (70.0, 10.0, -5.0, "ptt"),
            (f64::NAN, 10.0, 50.0, "weight_kg"),
            (70.0, f64::INFINITY, 50.0, "current_rate_ml_per_hr"),
            (70.0, 10.0, f64::INFINITY, "ptt"),
        ];

        for (weight, rate, ptt, expected_field) in cases {
            match evaluate(HIGH, STD, weight, rate, ptt) {
                Err(NomogramError::InvalidInput { field, .. }) => assert_eq!(field, expected_field),
                other => panic!("expected InvalidInput for {}, got {:?}", expected_field, other),
            }
        }
    }

    #[test]
    fn test_rule_tables_end_unbounded() {
        for protocol in [HIGH, LOW] {
            let rules = rules_for(protocol);
            assert_eq!(rules[rules.len() - 1].upper, PttBound::Unbounded);
        }
        assert_eq!(HIGH_INTENSITY_RULES.len(), 5);
        assert_eq!(STANDARD_LOW_INTENSITY_RULES.len(), 3);
    }
}
