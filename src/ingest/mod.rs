/// Data ingest for the GeoGLOWS flood warning service.
///
/// - `forecast` — per-reach ensemble forecast CSVs from the dated
///   extraction folders on disk.
/// - `geoglows` — HistoricSimulation API client with bounded retry and a
///   local CSV cache.
/// - `fixtures` (test only) — representative payloads for parser tests.
///
/// Ingest owns every retry and every file path; the analysis core only ever
/// sees resolved in-memory series.

pub mod fixtures;
pub mod forecast;
pub mod geoglows;
