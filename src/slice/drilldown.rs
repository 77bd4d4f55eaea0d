//! URL drilldowns configured on a chart

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a URL drilldown points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrilldownTarget {
    Dashboards,
    Slices,
}

/// A configured jump from a chart column or metric to a dashboard or slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlDrilldown {
    #[serde(default)]
    pub title: String,
    /// Column or metric label the drilldown is attached to
    pub field: String,
    #[serde(rename = "type")]
    pub target: DrilldownTarget,
    /// Id of the target dashboard or slice, as a number or a string
    pub url: Value,
}

impl UrlDrilldown {
    /// Target id as text (dashboards may be addressed by slug)
    pub fn target_id(&self) -> Option<String> {
        match &self.url {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Target id as a slice id
    pub fn target_slice_id(&self) -> Option<i64> {
        self.target_id()?.parse().ok()
    }
}
