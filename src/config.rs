//! Engine settings

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::composer::DEFAULT_ALL_LABEL;
use crate::dates::DEFAULT_DATE_FORMAT;
use crate::handoff::ReadPolicy;

fn default_all_label() -> String {
    DEFAULT_ALL_LABEL.to_string()
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

fn default_handoff_ttl_secs() -> u64 {
    3600
}

/// Settings of a [`DrilldownEngine`](crate::engine::DrilldownEngine)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Prefix of navigation URLs, e.g. `/superset`
    pub base_path: String,
    /// Context filter value meaning "no restriction"
    #[serde(default = "default_all_label")]
    pub all_label: String,
    /// strftime pattern for rendered time bounds
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_handoff_ttl_secs")]
    pub handoff_ttl_secs: u64,
    pub handoff_read_policy: ReadPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            all_label: default_all_label(),
            date_format: default_date_format(),
            handoff_ttl_secs: default_handoff_ttl_secs(),
            handoff_read_policy: ReadPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Lifetime of handoff records
    pub fn handoff_ttl(&self) -> Duration {
        let secs = i64::try_from(self.handoff_ttl_secs).unwrap_or(i64::MAX);
        Duration::seconds(secs.min(i64::MAX / 1_000))
    }

    /// `base_path` without a trailing slash
    pub fn base(&self) -> &str {
        self.base_path.trim_end_matches('/')
    }
}
