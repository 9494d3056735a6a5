//! Reads one session export into typed, augmented records.
//!
//! Exports start with two metadata lines that are skipped without being
//! parsed. The third line is the column header. Cells that fail to parse fall
//! back to the column's neutral value; only a missing required column fails
//! the file.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use crate::duration;
use crate::error::{Result, SwimError};
use crate::models::{LengthRecord, RawRecord, StrokeStyle};

pub const PREAMBLE_LINES: usize = 2;

pub const REQUIRED_COLUMNS: [&str; 9] = [
    "Dist (m)",
    "Cumul Dist (m)",
    "Length (m)",
    "Strk",
    "Strk Count",
    "Avg BPM (moving)",
    "Max BPM",
    "SWOLF",
    "Rest Time",
];

/// Accepted headers for the pace-per-interval column.
pub const PACE_COLUMNS: [&str; 3] = ["Pace/50", "Pace/100", "Pace/25"];

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Dist (m)")]
    distance: Option<String>,
    #[serde(rename = "Cumul Dist (m)")]
    cumulative_distance: Option<String>,
    #[serde(rename = "Length (m)")]
    length: Option<String>,
    #[serde(rename = "Pace/50", alias = "Pace/100", alias = "Pace/25")]
    pace: Option<String>,
    #[serde(rename = "Strk")]
    stroke: Option<String>,
    #[serde(rename = "Strk Count")]
    stroke_count: Option<String>,
    #[serde(rename = "Avg BPM (moving)")]
    avg_bpm: Option<String>,
    #[serde(rename = "Max BPM")]
    max_bpm: Option<String>,
    #[serde(rename = "SWOLF")]
    swolf: Option<String>,
    #[serde(rename = "Rest Time")]
    rest_time: Option<String>,
}

pub fn load_records(path: &Path) -> Result<Vec<LengthRecord>> {
    let file = File::open(path)?;
    let records = read_records(path, file)?;
    tracing::debug!(path = %path.display(), rows = records.len(), "loaded session export");
    Ok(records)
}

/// Parses an export from any reader. `path` is only used in errors and logs.
pub fn read_records<R: Read>(path: &Path, source: R) -> Result<Vec<LengthRecord>> {
    let mut source = BufReader::new(source);
    let mut skipped = Vec::new();
    for _ in 0..PREAMBLE_LINES {
        skipped.clear();
        if source.read_until(b'\n', &mut skipped)? == 0 {
            return Err(SwimError::MissingHeader {
                path: path.to_path_buf(),
            });
        }
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = lossy(reader.byte_headers()?);
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        return Err(SwimError::MissingHeader {
            path: path.to_path_buf(),
        });
    }
    let missing = missing_columns(&headers);
    if !missing.is_empty() {
        return Err(SwimError::Schema {
            path: path.to_path_buf(),
            missing,
        });
    }

    let mut records = Vec::new();
    let mut running_cumulative = 0.0_f64;
    let mut repaired = 0usize;

    for (index, result) in reader.byte_records().enumerate() {
        let row: CsvRow = lossy(&result?).deserialize(Some(&headers))?;
        let mut raw = raw_record(index + 1, row);

        if raw.cumulative_distance_m < running_cumulative {
            raw.cumulative_distance_m = running_cumulative;
            repaired += 1;
        }
        running_cumulative = raw.cumulative_distance_m;

        records.push(augment(raw));
    }

    if repaired > 0 {
        tracing::warn!(
            path = %path.display(),
            rows = repaired,
            "carried cumulative distance forward on rows that went backwards"
        );
    }

    Ok(records)
}

/// Adds the derived pace and rest columns to a raw row.
pub fn augment(raw: RawRecord) -> LengthRecord {
    let pace_seconds = duration::pace_seconds(raw.pace_raw.as_deref());
    let rest_seconds = duration::rest_seconds(raw.rest_time_raw.as_deref());
    LengthRecord {
        raw,
        pace_seconds,
        rest_seconds,
    }
}

/// Decodes a row cell by cell, replacing invalid UTF-8 so one bad cell only
/// loses its own value.
fn lossy(record: &csv::ByteRecord) -> csv::StringRecord {
    record.iter().map(String::from_utf8_lossy).collect()
}

fn missing_columns(headers: &csv::StringRecord) -> Vec<String> {
    let present = |name: &str| headers.iter().any(|header| header == name);
    let mut missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| !present(name))
        .map(|name| name.to_string())
        .collect();
    if !PACE_COLUMNS.iter().any(|name| present(name)) {
        missing.push(PACE_COLUMNS[0].to_string());
    }
    missing
}

fn raw_record(length_index: usize, row: CsvRow) -> RawRecord {
    let mut distance_m = number(row.distance.as_deref());
    let stroke_style = match row.stroke.as_deref().map(str::trim) {
        _ if distance_m == 0.0 => StrokeStyle::Rest,
        Some(code) if !code.is_empty() => StrokeStyle::from_code(code),
        _ => StrokeStyle::Other("?".to_string()),
    };
    if stroke_style.is_rest() {
        distance_m = 0.0;
    }

    RawRecord {
        length_index,
        distance_m,
        cumulative_distance_m: number(row.cumulative_distance.as_deref()),
        length_m: number(row.length.as_deref()),
        stroke_style,
        pace_raw: non_blank(row.pace),
        rest_time_raw: non_blank(row.rest_time),
        avg_heart_rate: count(row.avg_bpm.as_deref()),
        max_heart_rate: count(row.max_bpm.as_deref()),
        efficiency_score: count(row.swolf.as_deref()),
        stroke_count: count(row.stroke_count.as_deref()),
    }
}

fn non_blank(cell: Option<String>) -> Option<String> {
    cell.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Non-negative number, `0.0` for blank or unparseable cells.
fn number(cell: Option<&str>) -> f64 {
    cell.and_then(|value| value.trim().replace(',', "").parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value >= 0.0)
        .unwrap_or(0.0)
}

fn count(cell: Option<&str>) -> u32 {
    number(cell).round().min(f64::from(u32::MAX)) as u32
}
