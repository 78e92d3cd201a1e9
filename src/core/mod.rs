pub mod batch;
pub mod engine;
pub mod nomogram;

pub use crate::domain::model::{BatchResult, BatchRow, PatientRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
