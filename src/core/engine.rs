use crate::core::Pipeline;
use crate::domain::model::BatchResult;
use crate::utils::error::Result;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct EngineSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub outputs: Vec<String>,
}

pub struct NomogramEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> NomogramEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn run(&self) -> Result<EngineSummary> {
        let started = Instant::now();
        tracing::info!("Starting batch nomogram evaluation...");

        // Extract
        let records = self.pipeline.extract()?;
        tracing::info!("📥 Read {} patient records", records.len());

        // Evaluate
        let result: BatchResult = self.pipeline.evaluate(records)?;
        tracing::info!(
            "🧮 Evaluated {} records ({} failed)",
            result.outcomes.len(),
            result.failed()
        );

        // Load
        let outputs = self.pipeline.load(&result)?;
        for path in &outputs {
            tracing::info!("📁 Output saved to: {}", path);
        }

        tracing::debug!("Batch finished in {:?}", started.elapsed());

        Ok(EngineSummary {
            total: result.outcomes.len(),
            succeeded: result.succeeded(),
            failed: result.failed(),
            outputs,
        })
    }
}
