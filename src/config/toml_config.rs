use crate::app::report::OutputFormat;
use crate::core::ConfigProvider;
use crate::domain::model::{ConcentrationOption, ProtocolType};
use crate::utils::error::{NomogramError, Result};
use crate::utils::validation::{validate_output_formats, validate_path, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SUPPORTED_BATCH_FORMATS: [&str; 2] = ["csv", "json"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    pub protocol: Option<ProtocolType>,
    pub concentration: Option<ConcentrationOption>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    pub input: Option<String>,
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default = "default_output_formats")]
    pub output_formats: Vec<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input: None,
            output_path: default_output_path(),
            output_formats: default_output_formats(),
        }
    }
}

fn default_output_path() -> String {
    "./output".to_string()
}

fn default_output_formats() -> Vec<String> {
    vec!["csv".to_string()]
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub json: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(NomogramError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| NomogramError::ConfigParse {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${BATCH_INPUT})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| NomogramError::ConfigParse {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("batch.output_path", &self.batch.output_path)?;

        if let Some(input) = &self.batch.input {
            validate_path("batch.input", input)?;
        }

        validate_output_formats(
            "batch.output_formats",
            &self.batch.output_formats,
            &SUPPORTED_BATCH_FORMATS,
        )?;

        Ok(())
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output.format.unwrap_or_default()
    }
}

impl ConfigProvider for TomlConfig {
    fn default_protocol(&self) -> ProtocolType {
        self.defaults.protocol.unwrap_or_default()
    }

    fn default_concentration(&self) -> ConcentrationOption {
        self.defaults.concentration.unwrap_or_default()
    }

    fn output_path(&self) -> &str {
        &self.batch.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.batch.output_formats
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
