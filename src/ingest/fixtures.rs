/// Test fixtures: representative payloads from the GeoGLOWS data sources.
///
/// Structurally complete but truncated to the minimum needed to exercise
/// the parsers.
///
/// HistoricSimulation JSON shape (columnar, parallel arrays):
///   { "datetime": ["YYYY-MM-DD HH:MM:SS", ...], "flow": [m³/s, ...],
///     "metadata": { ... } }            — metadata ignored by the parser
///
/// Forecast extraction CSV shape:
///   datetime,ensemble_01,…,ensemble_52
///   one row per timestep; empty cells are missing values; member columns
///   may be absent entirely when extraction of that member failed.

/// Six historical timesteps spanning three calendar years; annual maxima
/// are 2010→340.1, 2011→512.7, 2012→298.4.
#[cfg(test)]
pub(crate) fn fixture_historic_simulation_json() -> &'static str {
    r#"{
      "datetime": [
        "2010-01-01 00:00:00",
        "2010-06-15 00:00:00",
        "2011-03-02 00:00:00",
        "2011-09-20 00:00:00",
        "2012-02-11 00:00:00",
        "2012-07-04 00:00:00"
      ],
      "flow": [118.2, 340.1, 512.7, 201.3, 298.4, 155.0],
      "metadata": {
        "reach_id": 9004355,
        "units": "m^3/s",
        "source": "GeoGLOWS ECMWF Streamflow Service"
      }
    }"#
}

/// Structurally valid response with no values — the API answers this way
/// for unknown reach ids. Must surface as NoDataAvailable, not success.
#[cfg(test)]
pub(crate) fn fixture_historic_empty_json() -> &'static str {
    r#"{ "datetime": [], "flow": [], "metadata": { "reach_id": 0 } }"#
}

/// Three-member forecast CSV (members 01, 02 and the high-resolution 52)
/// over three timesteps. Member 02 is missing its middle value.
#[cfg(test)]
pub(crate) fn fixture_forecast_csv() -> &'static str {
    "datetime,ensemble_01,ensemble_02,ensemble_52\n\
     2014-01-01 00:00:00,17.5,18.3,17.9\n\
     2014-01-01 03:00:00,21.0,,20.4\n\
     2014-01-01 06:00:00,19.2,22.9,19.8\n"
}
