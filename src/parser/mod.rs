//! Payload parser (verb module)
//!
//! Loads engine settings from YAML or JSON and hierarchy definitions from the
//! backend's JSON payload.

use serde::Deserialize;
use std::path::Path;

use crate::config::EngineConfig;
use crate::error::ParseError;
use crate::hierarchy::{HierarchyDefinition, HierarchyIndex};

fn read(path: &Path) -> Result<String, ParseError> {
    std::fs::read_to_string(path).map_err(|e| ParseError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Parse engine settings from a YAML or JSON file
pub fn parse_config_file<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ParseError> {
    parse_config_str(&read(path.as_ref())?)
}

/// Parse engine settings from a YAML or JSON string
///
/// An empty document yields the defaults.
pub fn parse_config_str(contents: &str) -> Result<EngineConfig, ParseError> {
    if contents.trim().is_empty() {
        return Ok(EngineConfig::default());
    }
    serde_yaml::from_str(contents).map_err(ParseError::from)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HierarchyPayload {
    List(Vec<HierarchyDefinition>),
    Wrapped { hierarchy: Vec<HierarchyDefinition> },
}

/// Parse hierarchy definitions from a JSON file
pub fn parse_hierarchies_file<P: AsRef<Path>>(path: P) -> Result<HierarchyIndex, ParseError> {
    parse_hierarchies_str(&read(path.as_ref())?)
}

/// Parse hierarchy definitions from JSON
///
/// Accepts a bare list or a chart payload carrying the list under
/// `hierarchy`.
pub fn parse_hierarchies_str(json: &str) -> Result<HierarchyIndex, ParseError> {
    let hierarchies = match serde_json::from_str(json)? {
        HierarchyPayload::List(list) => list,
        HierarchyPayload::Wrapped { hierarchy } => hierarchy,
    };
    Ok(HierarchyIndex::new(hierarchies))
}
