/// glowarn_service: GeoGLOWS ensemble streamflow flood warning service.
///
/// # Module structure
///
/// ```text
/// glowarn_service
/// ├── model       — shared data types (AlarmLevel, ReturnPeriodTable, EnsembleForecast, …)
/// ├── config      — run configuration loader (geowarn.toml)
/// ├── drainage    — drainage network reach registry (reaches.toml)
/// ├── logging     — structured console/file logging, per-unit failure helper
/// ├── ingest
/// │   ├── forecast — per-reach ensemble forecast CSVs from dated extraction folders
/// │   ├── geoglows — HistoricSimulation API client: bounded retry + local cache
/// │   └── fixtures (test only) — representative payloads for parser tests
/// ├── analysis
/// │   ├── return_periods — Gumbel Type I thresholds from annual maxima
/// │   ├── ensemble       — descriptive quantile statistics (reporting only)
/// │   ├── warnings       — daily exceedance + escalation → alarm level
/// │   └── events         — alarm-series segmentation + per-reach summaries
/// └── runner      — study orchestration (thread pool, CSV outputs, event pass)
/// ```

/// Public modules
pub mod analysis;
pub mod config;
pub mod drainage;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod runner;
