pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::app::report::OutputFormat;
#[cfg(feature = "cli")]
use crate::config::toml_config::{LoggingConfig, TomlConfig};
#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::model::{ConcentrationOption, PatientInput, ProtocolType};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_path, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "heparin-nomogram")]
#[command(about = "Heparin infusion adjustment from a PTT nomogram")]
pub struct CliConfig {
    /// high-intensity (weight based) or standard-low-intensity (fixed dose)
    #[arg(long)]
    pub protocol: Option<ProtocolType>,

    /// standard (100 units/ml) or concentrate (500 units/ml)
    #[arg(long)]
    pub concentration: Option<ConcentrationOption>,

    /// Patient weight (kg)
    #[arg(long, allow_negative_numbers = true)]
    pub weight: f64,

    /// Current infusion pump rate (ml/hr)
    #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
    pub rate: f64,

    /// Latest PTT value
    #[arg(long, allow_negative_numbers = true)]
    pub ptt: f64,

    /// Output format: text or json
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Optional TOML file with defaults
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

/// 合併命令列與設定檔後的單次評估請求
#[cfg(feature = "cli")]
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRequest {
    pub protocol: ProtocolType,
    pub concentration: ConcentrationOption,
    pub input: PatientInput,
    pub format: OutputFormat,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 載入並驗證 `--config` 指定的檔案；未指定時使用預設值
    pub fn load_file_config(&self) -> Result<TomlConfig> {
        match &self.config {
            Some(path) => {
                let file = TomlConfig::from_file(path)?;
                file.validate()?;
                Ok(file)
            }
            None => Ok(TomlConfig::default()),
        }
    }

    /// 命令列旗標與設定檔 [logging] 任一開啟即生效
    pub fn logging_options(&self, file: &TomlConfig) -> LoggingConfig {
        LoggingConfig {
            verbose: self.verbose || file.logging.verbose,
            json: self.json_logs || file.logging.json,
        }
    }

    /// 命令列參數優先於設定檔
    pub fn resolve(&self, file: &TomlConfig) -> EvaluationRequest {
        EvaluationRequest {
            protocol: self.protocol.unwrap_or_else(|| file.default_protocol()),
            concentration: self
                .concentration
                .unwrap_or_else(|| file.default_concentration()),
            input: PatientInput::new(self.weight, self.rate, self.ptt),
            format: self.format.unwrap_or_else(|| file.output_format()),
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(path) = &self.config {
            validate_path("config", path)?;
        }
        Ok(())
    }
}
