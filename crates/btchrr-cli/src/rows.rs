//! Loading bind rows from JSON

use std::path::Path;

use anyhow::{Context, Result, bail};
use btchrr_core::Value;

/// Parse rows from JSON text.
///
/// Accepts an array of arrays (one inner array per row) or an array of
/// scalars (one single-value row each).
pub fn parse_rows(json: &str) -> Result<Vec<Vec<Value>>> {
    let parsed: serde_json::Value = serde_json::from_str(json).context("Rows are not valid JSON")?;
    let serde_json::Value::Array(items) = parsed else {
        bail!("Rows must be a JSON array");
    };

    Ok(items
        .into_iter()
        .map(|item| match item {
            serde_json::Value::Array(values) => values.into_iter().map(Value::from).collect(),
            scalar => vec![Value::from(scalar)],
        })
        .collect())
}

/// Read rows from a file, or stdin when `path` is `-`
pub fn read_rows(path: &Path) -> Result<Vec<Vec<Value>>> {
    let content = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin()).context("Failed to read rows from stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rows file: {}", path.display()))?
    };
    parse_rows(&content)
}
