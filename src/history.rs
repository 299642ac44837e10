//! Closing prices from a local CSV history file.
//!
//! Expects a header row. The close column is matched case-insensitively,
//! and when a `date` column is present rows are ordered by it (`%Y-%m-%d`).

use crate::error::ArtifactError;
use chrono::NaiveDate;
use std::io::Read;
use std::path::Path;

pub const DEFAULT_CLOSE_COLUMN: &str = "close";

/// Read closing prices from a CSV file, oldest first.
pub fn load_closes(path: impl AsRef<Path>, column: &str) -> Result<Vec<f64>, ArtifactError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| ArtifactError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_closes(file, column)
}

/// Read closing prices from any CSV source, oldest first.
pub fn read_closes<R: Read>(reader: R, column: &str) -> Result<Vec<f64>, ArtifactError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = reader.headers()?.clone();

    let close_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(column))
        .ok_or_else(|| {
            ArtifactError::InvalidHistory(format!("no '{}' column in header", column))
        })?;
    let date_idx = headers.iter().position(|h| h.eq_ignore_ascii_case("date"));

    let mut rows: Vec<(Option<NaiveDate>, f64)> = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 1;

        let raw = record.get(close_idx).unwrap_or("");
        let close: f64 = raw.parse().map_err(|_| {
            ArtifactError::InvalidHistory(format!("row {}: invalid close '{}'", row, raw))
        })?;
        if !close.is_finite() {
            return Err(ArtifactError::InvalidHistory(format!(
                "row {}: close is not finite",
                row
            )));
        }

        let date = match date_idx {
            Some(idx) => {
                let raw = record.get(idx).unwrap_or("");
                Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                    ArtifactError::InvalidHistory(format!("row {}: invalid date '{}'", row, raw))
                })?)
            }
            None => None,
        };

        rows.push((date, close));
    }

    if rows.is_empty() {
        return Err(ArtifactError::InvalidHistory("no price rows".to_string()));
    }

    // Stable, so equal dates keep file order
    rows.sort_by_key(|(date, _)| *date);
    Ok(rows.into_iter().map(|(_, close)| close).collect())
}
