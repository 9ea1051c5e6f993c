/// GeoGLOWS HistoricSimulation API client.
///
/// Retrieves the full historical simulation series for a reach, the input
/// to return-period fitting:
///   https://geoglows.ecmwf.int/api/HistoricSimulation/?reach_id={comid}&return_format=json
///
/// Fetches run under a bounded retry policy with linear backoff and an
/// explicit `RetriesExhausted` failure — a run must be able to tell "this
/// reach is unavailable" from "still waiting". A local CSV cache under
/// `{historical_dir}/{comid}.csv` is consulted before the network and
/// populated after a successful fetch; return-period fitting dominates
/// per-reach cost, so the cache is what makes multi-date runs tractable.

use chrono::NaiveDateTime;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::model::{FetchError, ReachId};

const HISTORIC_SIMULATION_URL: &str = "https://geoglows.ecmwf.int/api/HistoricSimulation/";

/// Timestamp format in both the API payload and the local cache.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Cache CSV header; discharge is m³/s throughout GeoGLOWS.
const CACHE_HEADER: &str = "datetime,streamflow_m^3/s";

// ---------------------------------------------------------------------------
// Retry policy
// ---------------------------------------------------------------------------

/// Bounded retry with linear backoff: attempt n sleeps
/// `initial_backoff_secs * n` before retrying.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_secs: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde structures for the JSON payload
// ---------------------------------------------------------------------------

/// Columnar JSON shape of a HistoricSimulation response: parallel arrays of
/// timestamps and flows. See `fixtures.rs` for a representative payload.
#[derive(Deserialize)]
struct HistoricResponse {
    datetime: Vec<String>,
    flow: Vec<f64>,
}

// ---------------------------------------------------------------------------
// URL construction and parsing
// ---------------------------------------------------------------------------

/// Builds the HistoricSimulation request URL for one reach.
pub fn build_historic_simulation_url(reach_id: ReachId) -> String {
    format!(
        "{}?reach_id={}&return_format=json",
        HISTORIC_SIMULATION_URL, reach_id
    )
}

/// Parses a HistoricSimulation JSON body into a (timestamp, discharge)
/// series.
///
/// # Errors
/// - `FetchError::ParseError` — malformed JSON, mismatched array lengths,
///   or an unparseable timestamp.
/// - `FetchError::NoDataAvailable` — structurally valid but empty series.
pub fn parse_historic_response(json: &str) -> Result<Vec<(NaiveDateTime, f64)>, FetchError> {
    let response: HistoricResponse = serde_json::from_str(json)
        .map_err(|e| FetchError::ParseError(format!("JSON deserialization failed: {}", e)))?;

    if response.datetime.len() != response.flow.len() {
        return Err(FetchError::ParseError(format!(
            "datetime/flow length mismatch: {} vs {}",
            response.datetime.len(),
            response.flow.len()
        )));
    }
    if response.datetime.is_empty() {
        return Err(FetchError::NoDataAvailable(
            "historic simulation response is empty".to_string(),
        ));
    }

    let mut series = Vec::with_capacity(response.datetime.len());
    for (raw, flow) in response.datetime.iter().zip(response.flow) {
        let timestamp = parse_timestamp(raw)?;
        series.push((timestamp, flow));
    }
    Ok(series)
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, FetchError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| FetchError::ParseError(format!("bad timestamp '{}': {}", raw, e)))
}

// ---------------------------------------------------------------------------
// Fetching with bounded retry
// ---------------------------------------------------------------------------

/// Fetches the historical simulation for one reach from the GeoGLOWS API,
/// retrying transient failures under `policy`.
///
/// # Errors
/// `FetchError::RetriesExhausted` once every attempt has failed; the last
/// underlying error is logged by the caller, not folded into the result.
pub fn fetch_historic_simulation(
    reach_id: ReachId,
    policy: &RetryPolicy,
) -> Result<Vec<(NaiveDateTime, f64)>, FetchError> {
    let url = build_historic_simulation_url(reach_id);
    let client = reqwest::blocking::Client::new();

    for attempt in 1..=policy.max_attempts {
        match try_fetch(&client, &url) {
            Ok(series) => return Ok(series),
            Err(err) => {
                eprintln!(
                    "   ⚠ Reach {} attempt {}/{} failed: {}",
                    reach_id, attempt, policy.max_attempts, err
                );
                if attempt < policy.max_attempts {
                    thread::sleep(Duration::from_secs(
                        policy.initial_backoff_secs * attempt as u64,
                    ));
                }
            }
        }
    }

    Err(FetchError::RetriesExhausted {
        reach_id,
        attempts: policy.max_attempts,
    })
}

fn try_fetch(
    client: &reqwest::blocking::Client,
    url: &str,
) -> Result<Vec<(NaiveDateTime, f64)>, FetchError> {
    let response = client
        .get(url)
        .send()
        .map_err(|e| FetchError::ParseError(format!("request failed: {}", e)))?;
    if !response.status().is_success() {
        return Err(FetchError::HttpError(response.status().as_u16()));
    }
    let body = response
        .text()
        .map_err(|e| FetchError::ParseError(format!("body read failed: {}", e)))?;
    parse_historic_response(&body)
}

// ---------------------------------------------------------------------------
// Local CSV cache
// ---------------------------------------------------------------------------

/// Cache file for one reach's historical series.
pub fn cache_path(historical_dir: &Path, reach_id: ReachId) -> PathBuf {
    historical_dir.join(format!("{}.csv", reach_id))
}

/// Loads a reach's historical series from the local cache, fetching from the
/// API (and writing the cache) on a miss.
pub fn load_or_fetch(
    historical_dir: &Path,
    reach_id: ReachId,
    policy: &RetryPolicy,
) -> Result<Vec<(NaiveDateTime, f64)>, FetchError> {
    let path = cache_path(historical_dir, reach_id);
    if path.exists() {
        let text = fs::read_to_string(&path)
            .map_err(|e| FetchError::Io(format!("{}: {}", path.display(), e)))?;
        return parse_cache_csv(&text);
    }

    let series = fetch_historic_simulation(reach_id, policy)?;
    fs::create_dir_all(historical_dir)?;
    fs::write(&path, render_cache_csv(&series))
        .map_err(|e| FetchError::Io(format!("{}: {}", path.display(), e)))?;
    Ok(series)
}

/// Parses the cache CSV written by `render_cache_csv`.
pub fn parse_cache_csv(text: &str) -> Result<Vec<(NaiveDateTime, f64)>, FetchError> {
    let mut series = Vec::new();
    for line in text.lines().skip(1).filter(|l| !l.trim().is_empty()) {
        let (raw_timestamp, raw_flow) = line.split_once(',').ok_or_else(|| {
            FetchError::ParseError(format!("malformed cache line '{}'", line))
        })?;
        let timestamp = parse_timestamp(raw_timestamp.trim())?;
        let flow = raw_flow
            .trim()
            .parse::<f64>()
            .map_err(|e| FetchError::ParseError(format!("bad discharge '{}': {}", raw_flow, e)))?;
        series.push((timestamp, flow));
    }
    if series.is_empty() {
        return Err(FetchError::NoDataAvailable(
            "cache file has no data rows".to_string(),
        ));
    }
    Ok(series)
}

fn render_cache_csv(series: &[(NaiveDateTime, f64)]) -> String {
    let mut out = String::with_capacity(series.len() * 32);
    out.push_str(CACHE_HEADER);
    out.push('\n');
    for (timestamp, flow) in series {
        out.push_str(&format!("{},{}\n", timestamp.format(TIMESTAMP_FORMAT), flow));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fixtures::*;

    #[test]
    fn test_url_contains_reach_id_and_json_format() {
        let url = build_historic_simulation_url(9004355);
        assert_eq!(
            url,
            "https://geoglows.ecmwf.int/api/HistoricSimulation/?reach_id=9004355&return_format=json"
        );
    }

    #[test]
    fn test_parse_historic_simulation_fixture() {
        let series = parse_historic_response(fixture_historic_simulation_json()).unwrap();
        assert_eq!(series.len(), 6);
        assert_eq!(series[0].1, 118.2);
        assert_eq!(series[0].0.format("%Y-%m-%d").to_string(), "2010-01-01");
    }

    #[test]
    fn test_empty_response_is_no_data() {
        let result = parse_historic_response(fixture_historic_empty_json());
        assert!(matches!(result, Err(FetchError::NoDataAvailable(_))));
    }

    #[test]
    fn test_length_mismatch_is_parse_error() {
        let json = r#"{ "datetime": ["2010-01-01 00:00:00"], "flow": [] }"#;
        assert!(matches!(
            parse_historic_response(json),
            Err(FetchError::ParseError(_))
        ));
    }

    #[test]
    fn test_cache_round_trip() {
        let series = parse_historic_response(fixture_historic_simulation_json()).unwrap();
        let rendered = render_cache_csv(&series);
        assert!(rendered.starts_with(CACHE_HEADER));
        let reparsed = parse_cache_csv(&rendered).unwrap();
        assert_eq!(reparsed, series);
    }

    #[test]
    fn test_iso_t_separator_accepted() {
        let json = r#"{ "datetime": ["2010-01-01T12:00:00"], "flow": [5.5] }"#;
        let series = parse_historic_response(json).unwrap();
        assert_eq!(series[0].1, 5.5);
    }
}
