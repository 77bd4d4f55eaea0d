//! Chart keys of the host application's chart store

use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of a chart slot: `"<prefix>_<sliceId>"`, with a `drilldown` segment
/// when the chart was itself produced by a drilldown
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartKey(String);

impl ChartKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key for a slice in the default `slice_` namespace
    pub fn for_slice(slice_id: i64) -> Self {
        Self(format!("slice_{}", slice_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Slice id segment of the key
    pub fn slice_id(&self) -> Option<i64> {
        self.0.split('_').nth(1)?.parse().ok()
    }

    /// Check if the chart in this slot is a drilldown result
    pub fn is_drilldown(&self) -> bool {
        self.0.split('_').any(|segment| segment == "drilldown")
    }
}

impl fmt::Display for ChartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
