use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Placeholder for missing values in tables
pub const EMPTY_CELL: &str = "-";

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a placeholder if None or blank
pub fn format_optional(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => EMPTY_CELL.to_string(),
    }
}

/// Format a date for display, e.g. "Aug 30, 2002"
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%b %d, %Y").to_string())
        .unwrap_or_else(|| EMPTY_CELL.to_string())
}

fn read_payload(data: &str) -> Result<String> {
    match data.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload file {}", path)),
        None => Ok(data.to_string()),
    }
}

/// Parse a JSON payload given on the command line.
/// `@path` reads the payload from a file.
pub fn parse_payload<T: DeserializeOwned>(data: &str) -> Result<T> {
    let raw = read_payload(data)?;
    serde_json::from_str(&raw).context("Payload is not valid JSON for this resource")
}

/// Apply a partial JSON object on top of `current`.
/// Fields missing from the payload keep their current value.
pub fn merge_payload<T: Serialize + DeserializeOwned>(current: &T, data: &str) -> Result<T> {
    let raw = read_payload(data)?;
    let patch: Value = serde_json::from_str(&raw).context("Payload is not valid JSON")?;
    let Value::Object(fields) = patch else {
        anyhow::bail!("Payload must be a JSON object");
    };

    let mut merged = serde_json::to_value(current)?;
    if let Value::Object(ref mut target) = merged {
        target.extend(fields);
    }
    serde_json::from_value(merged).context("Payload is not valid JSON for this resource")
}
