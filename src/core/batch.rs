use crate::core::nomogram::evaluate;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{
    BatchOutcome, BatchResult, BatchRow, ConcentrationOption, PatientInput, PatientRecord,
    ProtocolType,
};
use crate::utils::error::{NomogramError, Result};
use serde::Serialize;

pub const CSV_OUTPUT_FILE: &str = "nomogram_results.csv";
pub const JSON_OUTPUT_FILE: &str = "nomogram_results.json";

/// CSV 輸出的一列 (扁平化)
#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    patient_id: &'a str,
    protocol: Option<String>,
    concentration: Option<String>,
    weight_kg: Option<f64>,
    current_rate_ml_per_hr: Option<f64>,
    ptt: Option<f64>,
    severity: Option<String>,
    action_message: Option<&'a str>,
    bolus_units: Option<f64>,
    bolus_volume_ml: Option<f64>,
    rate_change_units_per_hr: Option<f64>,
    rate_change_ml: Option<f64>,
    new_rate_ml_per_hr: Option<f64>,
    rate_clamped: Option<bool>,
    hold_infusion_minutes: Option<u32>,
    error: Option<&'a str>,
}

impl<'a> From<&'a BatchOutcome> for OutputRow<'a> {
    fn from(outcome: &'a BatchOutcome) -> Self {
        let rec = outcome.recommendation.as_ref();
        Self {
            patient_id: &outcome.patient_id,
            protocol: outcome.protocol.map(|p| p.to_string()),
            concentration: outcome.concentration.map(|c| c.to_string()),
            weight_kg: outcome.input.map(|i| i.weight_kg),
            current_rate_ml_per_hr: outcome.input.map(|i| i.current_rate_ml_per_hr),
            ptt: outcome.input.map(|i| i.ptt_seconds),
            severity: rec.map(|r| r.severity.to_string()),
            action_message: rec.map(|r| r.action_message.as_str()),
            bolus_units: rec.map(|r| r.bolus_units),
            bolus_volume_ml: rec.map(|r| r.bolus_volume_ml),
            rate_change_units_per_hr: rec.map(|r| r.rate_change_units_per_hr),
            rate_change_ml: rec.map(|r| r.rate_change_ml),
            new_rate_ml_per_hr: rec.map(|r| r.new_rate_ml_per_hr),
            rate_clamped: rec.map(|r| r.rate_clamped),
            hold_infusion_minutes: rec.and_then(|r| r.hold_infusion_minutes),
            error: outcome.error.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    total: usize,
    succeeded: usize,
    failed: usize,
    results: &'a [BatchOutcome],
}

pub struct BatchEvaluator<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    input_file: String,
}

impl<S: Storage, C: ConfigProvider> BatchEvaluator<S, C> {
    pub fn new(storage: S, config: C, input_file: impl Into<String>) -> Self {
        Self {
            storage,
            config,
            input_file: input_file.into(),
        }
    }

    fn parse_number(field: &str, raw: &str) -> Result<f64> {
        raw.trim()
            .parse::<f64>()
            .map_err(|_| NomogramError::invalid_input(field, raw, "not a number"))
    }

    fn evaluate_record(&self, record: &PatientRecord) -> BatchOutcome {
        let mut outcome = BatchOutcome {
            patient_id: record.patient_id.clone(),
            protocol: None,
            concentration: None,
            input: None,
            recommendation: None,
            error: None,
        };

        let result = (|| -> Result<()> {
            // 每列可覆蓋預設的 protocol / concentration
            let protocol = match record.protocol.as_deref().filter(|s| !s.trim().is_empty()) {
                Some(raw) => raw.parse::<ProtocolType>()?,
                None => self.config.default_protocol(),
            };
            let concentration = match record
                .concentration
                .as_deref()
                .filter(|s| !s.trim().is_empty())
            {
                Some(raw) => raw.parse::<ConcentrationOption>()?,
                None => self.config.default_concentration(),
            };
            outcome.protocol = Some(protocol);
            outcome.concentration = Some(concentration);

            let input = PatientInput::new(
                Self::parse_number("weight_kg", &record.weight_kg)?,
                Self::parse_number("current_rate_ml_per_hr", &record.current_rate_ml_per_hr)?,
                Self::parse_number("ptt", &record.ptt)?,
            );
            outcome.input = Some(input);

            let recommendation = evaluate(
                protocol,
                concentration,
                input.weight_kg,
                input.current_rate_ml_per_hr,
                input.ptt_seconds,
            )?;
            outcome.recommendation = Some(recommendation);
            Ok(())
        })();

        if let Err(e) = result {
            tracing::warn!("⚠️ Patient {} skipped: {}", record.patient_id, e);
            outcome.error = Some(e.to_string());
        }

        outcome
    }

    fn render_csv(result: &BatchResult) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for outcome in &result.outcomes {
            writer.serialize(OutputRow::from(outcome))?;
        }
        writer
            .into_inner()
            .map_err(|e| NomogramError::IoError(e.into_error()))
    }

    fn render_json(result: &BatchResult) -> Result<Vec<u8>> {
        let report = JsonReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            total: result.outcomes.len(),
            succeeded: result.succeeded(),
            failed: result.failed(),
            results: &result.outcomes,
        };
        Ok(serde_json::to_vec_pretty(&report)?)
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for BatchEvaluator<S, C> {
    fn extract(&self) -> Result<Vec<BatchRow>> {
        tracing::debug!("Reading patient records from: {}", self.input_file);
        let data = self.storage.read_file(&self.input_file)?;

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(data.as_slice());

        // 標頭壞掉整批無法判讀，直接失敗
        let headers = reader.headers()?.clone();

        let mut rows = Vec::new();
        for (index, row) in reader.records().enumerate() {
            // 第 1 列是標頭
            let line = index + 2;
            let record = match row {
                Ok(record) => record,
                Err(e) => {
                    rows.push(BatchRow::Malformed {
                        patient_id: format!("row {}", line),
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            match record.deserialize::<PatientRecord>(Some(&headers)) {
                Ok(parsed) => rows.push(BatchRow::Parsed(parsed)),
                Err(e) => {
                    let patient_id = record
                        .get(0)
                        .filter(|id| !id.is_empty())
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("row {}", line));
                    rows.push(BatchRow::Malformed {
                        patient_id,
                        error: format!("malformed row {}: {}", line, e),
                    });
                }
            }
        }

        Ok(rows)
    }

    fn evaluate(&self, rows: Vec<BatchRow>) -> Result<BatchResult> {
        let outcomes = rows
            .into_iter()
            .map(|row| match row {
                BatchRow::Parsed(record) => self.evaluate_record(&record),
                BatchRow::Malformed { patient_id, error } => {
                    tracing::warn!("⚠️ Patient {} skipped: {}", patient_id, error);
                    BatchOutcome::failed(patient_id, error)
                }
            })
            .collect();
        Ok(BatchResult { outcomes })
    }

    fn load(&self, result: &BatchResult) -> Result<Vec<String>> {
        let mut written = Vec::new();

        for format in self.config.output_formats() {
            let (file_name, data) = match format.as_str() {
                "csv" => (CSV_OUTPUT_FILE, Self::render_csv(result)?),
                "json" => (JSON_OUTPUT_FILE, Self::render_json(result)?),
                other => {
                    return Err(NomogramError::InvalidConfigValue {
                        field: "batch.output_formats".to_string(),
                        value: other.to_string(),
                        reason: "Unsupported format. Valid formats: csv, json".to_string(),
                    })
                }
            };

            let path = format!("{}/{}", self.config.output_path(), file_name);
            tracing::debug!("Writing {} ({} bytes)", path, data.len());
            self.storage.write_file(&path, &data)?;
            written.push(path);
        }

        Ok(written)
    }
}
