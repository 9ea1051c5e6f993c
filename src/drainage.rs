/// Drainage network registry - parses reaches.toml
///
/// The registry lists every river reach the study covers, keyed by its
/// GeoGLOWS `comid`. Keeping it in configuration means adding a basin is a
/// data change, not a code change.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;

use crate::model::ReachId;

/// One reach entry from reaches.toml.
#[derive(Debug, Clone, Deserialize)]
pub struct ReachConfig {
    pub comid: ReachId,
    pub name: String,
    pub description: Option<String>,
}

/// Root structure for TOML parsing.
#[derive(Debug, Deserialize)]
struct DrainageRegistry {
    reach: Vec<ReachConfig>,
}

/// Loads the drainage network registry.
///
/// # Panics
/// Panics if the registry file is missing, malformed, or empty. Same policy
/// as `config::load_config`: there is nothing to analyze without reaches.
pub fn load_reaches(path: &str) -> Vec<ReachConfig> {
    let contents = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path, e));

    let registry: DrainageRegistry = toml::from_str(&contents)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path, e));

    if registry.reach.is_empty() {
        panic!("{}: no reaches configured", path);
    }

    registry.reach
}

/// Loads the registry as a lookup map keyed by comid.
pub fn load_reach_map(path: &str) -> HashMap<ReachId, ReachConfig> {
    load_reaches(path)
        .into_iter()
        .map(|r| (r.comid, r))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_reaches_succeeds() {
        let reaches = load_reaches("reaches.toml");
        assert!(reaches.len() >= 3, "registry should list several reaches");
    }

    #[test]
    fn test_all_reaches_have_identity() {
        for reach in load_reaches("reaches.toml") {
            assert!(reach.comid > 0, "comid must be positive");
            assert!(!reach.name.is_empty(), "name must not be empty");
        }
    }

    #[test]
    fn test_comids_are_unique() {
        let reaches = load_reaches("reaches.toml");
        let map = load_reach_map("reaches.toml");
        assert_eq!(reaches.len(), map.len(), "duplicate comid in registry");
    }
}
