//! Typed payloads exchanged through the handoff store

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

use super::store::{HandoffKey, HandoffStore};
use crate::error::{DrillError, DrillResult};
use crate::filter::Filter;

/// Filters to preselect on the target dashboard, keyed by slice id
pub type PreselectFilters = BTreeMap<String, Vec<Filter>>;

/// Dashboard-level state carried into the target page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    #[serde(rename = "extraWhere", alias = "extra_where", default)]
    pub extra_where: String,
    #[serde(default, deserialize_with = "flat_filters")]
    pub filters: Vec<Filter>,
}

/// Accept a filter list, a list of filter lists, or an object of filter lists
fn flat_filters<'de, D>(deserializer: D) -> Result<Vec<Filter>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Entry {
        Many(Vec<Filter>),
        One(Filter),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Collection {
        List(Vec<Entry>),
        Keyed(BTreeMap<String, Entry>),
    }

    let collection = Option::<Collection>::deserialize(deserializer)?;
    let entries: Vec<Entry> = match collection {
        None => Vec::new(),
        Some(Collection::List(entries)) => entries,
        Some(Collection::Keyed(entries)) => entries.into_values().collect(),
    };
    Ok(entries
        .into_iter()
        .flat_map(|entry| match entry {
            Entry::Many(filters) => filters,
            Entry::One(filter) => vec![filter],
        })
        .collect())
}

fn to_payload<T: Serialize>(record: &T) -> DrillResult<Value> {
    serde_json::to_value(record).map_err(|e| DrillError::handoff(e.to_string()))
}

/// Serialize a record and put it into the store
pub fn store_record<T: Serialize>(store: &dyn HandoffStore, record: &T) -> DrillResult<HandoffKey> {
    Ok(store.put(to_payload(record)?))
}

/// Store two records, or neither when either fails to serialize
pub fn store_records<A: Serialize, B: Serialize>(
    store: &dyn HandoffStore,
    first: &A,
    second: &B,
) -> DrillResult<(HandoffKey, HandoffKey)> {
    let first = to_payload(first)?;
    let second = to_payload(second)?;
    Ok((store.put(first), store.put(second)))
}

/// Read a record back; a malformed payload reads as absent
pub fn load_record<T: DeserializeOwned>(store: &dyn HandoffStore, key: &HandoffKey) -> Option<T> {
    let payload = store.take(key)?;
    match serde_json::from_value(payload) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!("handoff: ignoring malformed record {}: {}", key, e);
            None
        }
    }
}
