pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, EvaluationRequest};

pub use crate::app::report::{BannerStyle, OutputFormat, Report};
pub use crate::config::{cli::LocalStorage, toml_config::TomlConfig};
pub use crate::core::{
    batch::BatchEvaluator,
    engine::NomogramEngine,
    nomogram::{evaluate, evaluate_input},
};
pub use crate::domain::model::{
    ConcentrationOption, PatientInput, ProtocolType, Recommendation, Severity,
};
pub use crate::utils::error::{NomogramError, Result};
