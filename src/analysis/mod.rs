/// Analysis core for the GeoGLOWS flood warning service.
///
/// Submodules, in dependency order:
/// - `return_periods` — Gumbel Type I thresholds from annual maxima.
/// - `ensemble` — descriptive quantile statistics per forecast (reporting only).
/// - `warnings` — daily exceedance + escalation → one alarm level per
///   (reach, issuance date).
/// - `events` — alarm-series segmentation into flood events and per-reach
///   severity histograms.
///
/// Everything here is a pure function over in-memory values: no I/O, no
/// retries, no shared mutable state. Fetching and persistence live in
/// `ingest` and `runner`.

pub mod ensemble;
pub mod events;
pub mod return_periods;
pub mod warnings;
