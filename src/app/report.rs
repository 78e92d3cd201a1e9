use crate::domain::model::{
    ConcentrationOption, PatientInput, ProtocolType, Recommendation, Severity,
};
use crate::utils::error::{NomogramError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = NomogramError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(NomogramError::InvalidConfigValue {
                field: "format".to_string(),
                value: other.to_string(),
                reason: "Valid formats: text, json".to_string(),
            }),
        }
    }
}

/// 結果橫幅樣式 (顏色由呈現層決定)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerStyle {
    Success,
    Warning,
    Error,
}

impl BannerStyle {
    pub fn color(self) -> &'static str {
        match self {
            BannerStyle::Success => "green",
            BannerStyle::Warning => "orange",
            BannerStyle::Error => "red",
        }
    }

    fn icon(self) -> &'static str {
        match self {
            BannerStyle::Success => "🟢",
            BannerStyle::Warning => "🟠",
            BannerStyle::Error => "🔴",
        }
    }

    fn tag(self) -> &'static str {
        match self {
            BannerStyle::Success => "OK",
            BannerStyle::Warning => "WARNING",
            BannerStyle::Error => "ERROR",
        }
    }
}

impl From<Severity> for BannerStyle {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Low => BannerStyle::Success,
            Severity::Medium => BannerStyle::Warning,
            Severity::High => BannerStyle::Error,
        }
    }
}

/// 整數單位並加上千分位，小數部分直接捨去
pub fn format_units(units: f64) -> String {
    let whole = units.trunc() as i64;
    let digits = whole.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if whole < 0 {
        format!("-{} units", grouped)
    } else {
        format!("{} units", grouped)
    }
}

pub fn format_rate(ml_per_hr: f64) -> String {
    format!("{:.1} ml/hr", ml_per_hr)
}

pub fn format_rate_delta(ml_per_hr: f64) -> String {
    format!("{:+.1} ml/hr", ml_per_hr)
}

pub fn describe_change(current_rate_ml_per_hr: f64, rate_change_ml: f64) -> String {
    let direction = if rate_change_ml > 0.0 {
        "increase"
    } else if rate_change_ml < 0.0 {
        "decrease"
    } else {
        return format!("(was {:.1} -> no change)", current_rate_ml_per_hr);
    };

    format!(
        "(was {:.1} -> {} {:.1} ml/hr)",
        current_rate_ml_per_hr,
        direction,
        rate_change_ml.abs()
    )
}

/// 單次評估的報表：輸入回顯加上建議
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub protocol: ProtocolType,
    pub concentration: ConcentrationOption,
    pub concentration_units_per_ml: f64,
    pub input: PatientInput,
    pub banner: BannerStyle,
    pub recommendation: Recommendation,
}

impl Report {
    pub fn new(
        protocol: ProtocolType,
        concentration: ConcentrationOption,
        input: PatientInput,
        recommendation: Recommendation,
    ) -> Self {
        Self {
            protocol,
            concentration,
            concentration_units_per_ml: concentration.units_per_ml(),
            input,
            banner: recommendation.severity.into(),
            recommendation,
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self.render_text()),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    pub fn render_text(&self) -> String {
        let rec = &self.recommendation;
        let mut out = String::new();

        // write! 到 String 不會失敗
        let _ = writeln!(
            out,
            "{} [{}] Assessment: {}",
            self.banner.icon(),
            self.banner.tag(),
            rec.action_message
        );
        let basis = if self.protocol.is_weight_based() {
            "weight based"
        } else {
            "fixed dose"
        };
        let _ = writeln!(
            out,
            "Protocol: {} ({}) | Concentration: {}",
            self.protocol,
            basis,
            self.concentration.label()
        );
        let _ = writeln!(
            out,
            "💉 Bolus: {} ({:.1} ml)",
            format_units(rec.bolus_units),
            rec.bolus_volume_ml
        );
        let _ = writeln!(
            out,
            "⚡ Set infusion pump to: {} ({})",
            format_rate(rec.new_rate_ml_per_hr),
            format_rate_delta(rec.rate_change_ml)
        );
        let _ = writeln!(
            out,
            "   {}",
            describe_change(self.input.current_rate_ml_per_hr, rec.rate_change_ml)
        );

        if let Some(minutes) = rec.hold_infusion_minutes {
            let _ = writeln!(
                out,
                "🛑 Hold infusion for {} min before restarting at the new rate",
                minutes
            );
        }

        if rec.rate_clamped {
            let _ = writeln!(out, "⚠️ Calculated rate was below zero and has been set to 0");
        }

        out
    }
}
