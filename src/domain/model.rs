use crate::utils::error::NomogramError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 藥物濃度 (units/ml)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConcentrationOption {
    /// 25,000 units in 250 ml
    #[default]
    Standard,
    /// 25,000 units in 50 ml
    Concentrate,
}

impl ConcentrationOption {
    pub fn units_per_ml(self) -> f64 {
        match self {
            ConcentrationOption::Standard => 100.0,
            ConcentrationOption::Concentrate => 500.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConcentrationOption::Standard => "Standard (100 units : 1 ml) [25,000u in 250ml]",
            ConcentrationOption::Concentrate => "Concentrate (500 units : 1 ml) [25,000u in 50ml]",
        }
    }
}

impl fmt::Display for ConcentrationOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConcentrationOption::Standard => write!(f, "standard"),
            ConcentrationOption::Concentrate => write!(f, "concentrate"),
        }
    }
}

impl FromStr for ConcentrationOption {
    type Err = NomogramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "100" => Ok(ConcentrationOption::Standard),
            "concentrate" | "500" => Ok(ConcentrationOption::Concentrate),
            other => Err(NomogramError::invalid_input(
                "concentration",
                other,
                "expected 'standard' (100) or 'concentrate' (500)",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProtocolType {
    /// 依體重計算 (units/kg/hr)
    #[default]
    HighIntensity,
    /// 固定劑量 (units/hr)
    StandardLowIntensity,
}

impl ProtocolType {
    pub fn is_weight_based(self) -> bool {
        matches!(self, ProtocolType::HighIntensity)
    }
}

impl fmt::Display for ProtocolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolType::HighIntensity => write!(f, "high-intensity"),
            ProtocolType::StandardLowIntensity => write!(f, "standard-low-intensity"),
        }
    }
}

impl FromStr for ProtocolType {
    type Err = NomogramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "high-intensity" | "high_intensity" => Ok(ProtocolType::HighIntensity),
            "standard" | "low" | "standard-low-intensity" | "standard_low_intensity" => {
                Ok(ProtocolType::StandardLowIntensity)
            }
            other => Err(NomogramError::invalid_input(
                "protocol",
                other,
                "expected 'high-intensity' or 'standard-low-intensity'",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientInput {
    pub weight_kg: f64,
    pub current_rate_ml_per_hr: f64,
    pub ptt_seconds: f64,
}

impl PatientInput {
    pub fn new(weight_kg: f64, current_rate_ml_per_hr: f64, ptt_seconds: f64) -> Self {
        Self {
            weight_kg,
            current_rate_ml_per_hr,
            ptt_seconds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// 單次評估的建議結果，每次呼叫都重新計算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action_message: String,
    pub severity: Severity,
    pub bolus_units: f64,
    pub rate_change_units_per_hr: f64,
    pub bolus_volume_ml: f64,
    /// 未經夾限的 ml/hr 變化量 (有正負號)
    pub rate_change_ml: f64,
    pub new_rate_ml_per_hr: f64,
    /// 新速率因為負值而被夾到 0
    pub rate_clamped: bool,
    pub hold_infusion_minutes: Option<u32>,
    pub current_dose_units_per_hr: f64,
}

/// 批次輸入的一列 (CSV)，數值欄位保留原文字，評估時才解析
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_id: String,
    pub weight_kg: String,
    pub current_rate_ml_per_hr: String,
    pub ptt: String,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub concentration: Option<String>,
}

/// extract 後的一列：可解析的紀錄，或無法解析的原始列
#[derive(Debug, Clone, PartialEq)]
pub enum BatchRow {
    Parsed(PatientRecord),
    Malformed { patient_id: String, error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub patient_id: String,
    pub protocol: Option<ProtocolType>,
    pub concentration: Option<ConcentrationOption>,
    pub input: Option<PatientInput>,
    pub recommendation: Option<Recommendation>,
    pub error: Option<String>,
}

impl BatchOutcome {
    pub fn failed(patient_id: String, error: String) -> Self {
        Self {
            patient_id,
            protocol: None,
            concentration: None,
            input: None,
            recommendation: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.recommendation.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct BatchResult {
    pub outcomes: Vec<BatchOutcome>,
}

impl BatchResult {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concentration_values() {
        assert_eq!(ConcentrationOption::Standard.units_per_ml(), 100.0);
        assert_eq!(ConcentrationOption::Concentrate.units_per_ml(), 500.0);
        assert_eq!(ConcentrationOption::default(), ConcentrationOption::Standard);
    }

    #[test]
    fn test_parse_concentration() {
        assert_eq!(
            "500".parse::<ConcentrationOption>().unwrap(),
            ConcentrationOption::Concentrate
        );
        assert_eq!(
            " Standard ".parse::<ConcentrationOption>().unwrap(),
            ConcentrationOption::Standard
        );
        assert!("250".parse::<ConcentrationOption>().is_err());
    }

    #[test]
    fn test_parse_protocol() {
        assert_eq!("high".parse::<ProtocolType>().unwrap(), ProtocolType::HighIntensity);
        assert_eq!(
            "low".parse::<ProtocolType>().unwrap(),
            ProtocolType::StandardLowIntensity
        );
        assert_eq!(
            ProtocolType::StandardLowIntensity
                .to_string()
                .parse::<ProtocolType>()
                .unwrap(),
            ProtocolType::StandardLowIntensity
        );
        assert!("medium".parse::<ProtocolType>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ProtocolType::StandardLowIntensity).unwrap();
        assert_eq!(json, "\"standard-low-intensity\"");
        let json = serde_json::to_string(&Severity::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }
}
