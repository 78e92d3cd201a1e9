use thiserror::Error;

#[derive(Error, Debug)]
pub enum NomogramError {
    #[error("Invalid input for {field}: {value} ({reason})")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid configuration value for {field}: {value} ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Io,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl NomogramError {
    pub fn invalid_input(field: &str, value: impl ToString, reason: &str) -> Self {
        NomogramError::InvalidInput {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            NomogramError::InvalidInput { .. } => ErrorCategory::Input,
            NomogramError::InvalidConfigValue { .. }
            | NomogramError::MissingConfig { .. }
            | NomogramError::ConfigParse { .. } => ErrorCategory::Configuration,
            NomogramError::IoError(_) => ErrorCategory::Io,
            NomogramError::CsvError(_) | NomogramError::SerializationError(_) => {
                ErrorCategory::Data
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            NomogramError::InvalidInput { field, value, reason } => {
                format!("Input '{}' = {} is not usable: {}", field, value, reason)
            }
            NomogramError::InvalidConfigValue { field, value, reason } => {
                format!("Config '{}' = {} is not valid: {}", field, value, reason)
            }
            NomogramError::MissingConfig { field } => {
                format!("Config '{}' is required but was not provided", field)
            }
            NomogramError::ConfigParse { message } => {
                format!("Could not read configuration: {}", message)
            }
            NomogramError::CsvError(e) => format!("Could not process CSV data: {}", e),
            NomogramError::IoError(e) => format!("File operation failed: {}", e),
            NomogramError::SerializationError(e) => format!("Could not encode output: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            NomogramError::InvalidInput { .. } => {
                "Check weight (> 0 kg), current rate (>= 0 ml/hr) and PTT (>= 0) and try again"
            }
            NomogramError::InvalidConfigValue { .. } => {
                "Fix the highlighted value in the configuration file or command line"
            }
            NomogramError::MissingConfig { .. } => {
                "Add the missing value to the configuration file or pass it as a flag"
            }
            NomogramError::ConfigParse { .. } => "Make sure the file is valid TOML",
            NomogramError::CsvError(_) => {
                "Check the CSV header: patient_id,weight_kg,current_rate_ml_per_hr,ptt"
            }
            NomogramError::IoError(_) => "Check that the path exists and is writable",
            NomogramError::SerializationError(_) => "Re-run with --verbose and report the output",
        }
    }

    /// 對應 CLI 結束代碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, NomogramError>;
