use crate::domain::model::{
    BatchResult, BatchRow, ConcentrationOption, ProtocolType,
};
use crate::utils::error::Result;

pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider {
    fn default_protocol(&self) -> ProtocolType;
    fn default_concentration(&self) -> ConcentrationOption;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
}

pub trait Pipeline {
    fn extract(&self) -> Result<Vec<BatchRow>>;
    fn evaluate(&self, rows: Vec<BatchRow>) -> Result<BatchResult>;
    fn load(&self, result: &BatchResult) -> Result<Vec<String>>;
}
