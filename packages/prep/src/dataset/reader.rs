//! Dataset loading from JSON or JSONL files.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{PrepError, Result};
use crate::types::Record;

/// Load a dataset file into records, in source order.
///
/// The file is parsed as one JSON document first: an array of records, or a
/// single record object. If that fails it is read as JSONL.
pub fn read_dataset(path: &Path) -> Result<Vec<Record>> {
    let text = fs::read_to_string(path).map_err(|e| PrepError::io(path, e))?;
    let records = parse_dataset(&text, path)?;
    tracing::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Parse dataset text. `source` only appears in error messages.
pub fn parse_dataset(text: &str, source: &Path) -> Result<Vec<Record>> {
    let text = text.trim();
    if text.is_empty() {
        return Err(PrepError::InvalidInput(format!(
            "input file {} is empty",
            source.display()
        )));
    }

    let values = match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(values)) => values,
        Ok(object @ Value::Object(_)) => vec![object],
        Ok(_) => {
            return Err(PrepError::InvalidInput(format!(
                "top-level JSON in {} must be a list of records",
                source.display()
            )))
        }
        Err(e) => {
            tracing::debug!(
                "{} is not a single JSON document ({e}), reading as JSONL",
                source.display()
            );
            parse_jsonl(text, source)?
        }
    };

    if values.is_empty() {
        return Err(PrepError::InvalidInput(format!(
            "no records found in {}",
            source.display()
        )));
    }

    values
        .into_iter()
        .enumerate()
        .map(|(position, value)| Record::from_value(value, position))
        .collect()
}

fn parse_jsonl(text: &str, source: &Path) -> Result<Vec<Value>> {
    let mut values = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value = serde_json::from_str(line).map_err(|e| {
            PrepError::InvalidInput(format!(
                "invalid JSON on line {} of {}: {e}",
                index + 1,
                source.display()
            ))
        })?;
        values.push(value);
    }
    Ok(values)
}
