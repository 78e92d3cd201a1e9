use crate::utils::error::{NomogramError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 病人數值必須為有限數字 (拒絕 NaN / ±∞)
pub fn validate_finite(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(NomogramError::invalid_input(
            field_name,
            value,
            "value is not a representable number",
        ));
    }
    Ok(())
}

pub fn validate_positive(field_name: &str, value: f64) -> Result<()> {
    validate_finite(field_name, value)?;
    if value <= 0.0 {
        return Err(NomogramError::invalid_input(
            field_name,
            value,
            "value must be greater than 0",
        ));
    }
    Ok(())
}

pub fn validate_non_negative(field_name: &str, value: f64) -> Result<()> {
    validate_finite(field_name, value)?;
    if value < 0.0 {
        return Err(NomogramError::invalid_input(
            field_name,
            value,
            "value cannot be negative",
        ));
    }
    Ok(())
}

/// 由輸入推算出的劑量必須仍是有限數字，否則歸咎於該輸入
pub fn validate_derived(field_name: &str, input: f64, derived: &[f64]) -> Result<()> {
    if derived.iter().any(|value| !value.is_finite()) {
        return Err(NomogramError::invalid_input(
            field_name,
            input,
            "value is too large to compute a dose",
        ));
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(NomogramError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(NomogramError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_output_formats(field_name: &str, formats: &[String], allowed: &[&str]) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed.iter().copied().collect();

    if formats.is_empty() {
        return Err(NomogramError::InvalidConfigValue {
            field: field_name.to_string(),
            value: "[]".to_string(),
            reason: format!("At least one format is required: {}", allowed.join(", ")),
        });
    }

    for format in formats {
        if !allowed_set.contains(format.as_str()) {
            return Err(NomogramError::InvalidConfigValue {
                field: field_name.to_string(),
                value: format.clone(),
                reason: format!("Unsupported format. Valid formats: {}", allowed.join(", ")),
            });
        }
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| NomogramError::MissingConfig {
        field: field_name.to_string(),
    })
}
