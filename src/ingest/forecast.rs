/// Ensemble forecast reader for the on-disk extraction layout.
///
/// The upstream extraction step writes one CSV per reach per issuance date:
///
///   {forecast_dir}/{YYYYMMDD.00}/{comid}.csv
///
/// with a header row `datetime,ensemble_01,…,ensemble_52` and timestamps in
/// `%Y-%m-%d %H:%M:%S`. `ensemble_52` is the high-resolution run. Empty
/// cells are missing values; entire member columns may be absent when a
/// member failed extraction — the parser tolerates both, and callers surface
/// the shortfall via `EnsembleForecast::missing_members`.

use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::{EnsembleForecast, FetchError, MemberTrace, ReachId};

/// Timestamp format used throughout the extraction CSVs.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Folder holding all reach CSVs for one issuance date. The `.00` suffix is
/// the 00Z forecast cycle, fixed by upstream convention.
pub fn forecast_folder(forecast_dir: &Path, date: NaiveDate) -> PathBuf {
    forecast_dir.join(format!("{}.00", date.format("%Y%m%d")))
}

/// Path of one reach's forecast CSV for one issuance date.
pub fn forecast_path(forecast_dir: &Path, reach_id: ReachId, date: NaiveDate) -> PathBuf {
    forecast_folder(forecast_dir, date).join(format!("{}.csv", reach_id))
}

/// Reads and parses one reach's ensemble forecast from disk.
pub fn read_ensemble_forecast(
    forecast_dir: &Path,
    reach_id: ReachId,
    date: NaiveDate,
) -> Result<EnsembleForecast, FetchError> {
    let path = forecast_path(forecast_dir, reach_id, date);
    let text = fs::read_to_string(&path)
        .map_err(|e| FetchError::Io(format!("{}: {}", path.display(), e)))?;
    parse_forecast_csv(reach_id, &text)
}

/// Parses the extraction CSV format into an `EnsembleForecast`.
///
/// # Errors
/// - `FetchError::ParseError` — missing/malformed header, unparseable
///   timestamp or value, or a ragged row.
/// - `FetchError::NoDataAvailable` — header only, no data rows, or no
///   member columns at all.
pub fn parse_forecast_csv(reach_id: ReachId, text: &str) -> Result<EnsembleForecast, FetchError> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| FetchError::NoDataAvailable("empty forecast file".to_string()))?;
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    if columns.first() != Some(&"datetime") {
        return Err(FetchError::ParseError(format!(
            "expected 'datetime' as first column, got '{}'",
            columns.first().unwrap_or(&"")
        )));
    }

    // Member indices from the `ensemble_NN` column names, in file order.
    let mut member_indices = Vec::with_capacity(columns.len() - 1);
    for column in &columns[1..] {
        let index = column
            .strip_prefix("ensemble_")
            .and_then(|suffix| suffix.parse::<u32>().ok())
            .ok_or_else(|| {
                FetchError::ParseError(format!("unrecognized member column '{}'", column))
            })?;
        member_indices.push(index);
    }
    if member_indices.is_empty() {
        return Err(FetchError::NoDataAvailable(
            "forecast file has no member columns".to_string(),
        ));
    }

    let mut timestamps = Vec::new();
    let mut traces: Vec<Vec<Option<f64>>> = vec![Vec::new(); member_indices.len()];
    for line in lines {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != columns.len() {
            return Err(FetchError::ParseError(format!(
                "row has {} fields, header has {}",
                fields.len(),
                columns.len()
            )));
        }
        let timestamp = NaiveDateTime::parse_from_str(fields[0], TIMESTAMP_FORMAT)
            .map_err(|e| FetchError::ParseError(format!("bad timestamp '{}': {}", fields[0], e)))?;
        timestamps.push(timestamp);

        for (slot, field) in fields[1..].iter().enumerate() {
            let value = if field.is_empty() {
                None
            } else {
                Some(field.parse::<f64>().map_err(|e| {
                    FetchError::ParseError(format!("bad discharge '{}': {}", field, e))
                })?)
            };
            traces[slot].push(value);
        }
    }

    if timestamps.is_empty() {
        return Err(FetchError::NoDataAvailable(
            "forecast file has no data rows".to_string(),
        ));
    }

    let members = member_indices
        .into_iter()
        .zip(traces)
        .map(|(member, values)| MemberTrace { member, values })
        .collect();

    Ok(EnsembleForecast {
        reach_id,
        timestamps,
        members,
    })
}
