//! Backend and host services the engine depends on

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::datasource::{DatasourceMeta, DatasourceRef};
use crate::de::nullable;
use crate::error::{DrillError, DrillResult};
use crate::filter::Filter;
use crate::handoff::HandoffStore;
use crate::slice::{ChartKey, FormData};

/// A chart of a dashboard definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSlice {
    pub slice_id: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Dashboard definition returned by `GET /dashboard/{id}/?json=true`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardDefinition {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "nullable")]
    pub slices: Vec<DashboardSlice>,
    /// Preselected filters keyed by slice id
    #[serde(default, deserialize_with = "nullable")]
    pub filters: BTreeMap<String, Vec<Filter>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Read access to slices, datasources and dashboards
#[async_trait]
pub trait SliceBackend: Send + Sync {
    /// `GET /slice_formdata/{slice_id}`
    async fn slice_form_data(&self, slice_id: i64) -> DrillResult<FormData>;

    /// `GET /datasource/{type}/{id}`
    async fn datasource(&self, datasource: &DatasourceRef) -> DrillResult<DatasourceMeta>;

    /// `GET /dashboard/{id}/?json=true`
    async fn dashboard(&self, dashboard_id: &str) -> DrillResult<DashboardDefinition>;
}

/// A chart state pushed before it is replaced by a drilldown
#[derive(Debug, Clone, PartialEq)]
pub struct PreviousSliceState {
    /// Slice the drill chain started from
    pub root_slice_id: i64,
    /// Hierarchy column drilled into, for hierarchy drilldowns
    pub drilled_value: Option<String>,
    pub from_drilldown: bool,
    pub form_data: FormData,
}

/// An in-place replacement of a chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartReplacement {
    pub chart_key: ChartKey,
    pub slice_id: i64,
    pub form_data: FormData,
    pub datasource: DatasourceMeta,
    pub from_drilldown: bool,
}

/// Host-side chart state
#[async_trait]
pub trait ChartStateSink: Send + Sync {
    /// Remember the dashboard being left, under its history id and position
    async fn save_dashboard_state(&self, hid: &str, hid_index: u32);

    /// Push a chart state so the drilldown can be reverted
    async fn save_slice_state(&self, state: PreviousSliceState);

    /// Replace a chart with a new slice, form data and datasource
    async fn replace_chart(&self, replacement: ChartReplacement);
}

/// Full page navigation
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate(&self, url: &str);
}

/// Non-fatal error display
pub trait Notifier: Send + Sync {
    fn notify_error(&self, error: &DrillError);
}

/// The services a [`DrilldownEngine`](super::DrilldownEngine) talks to
#[derive(Clone)]
pub struct Collaborators {
    pub backend: Arc<dyn SliceBackend>,
    pub sink: Arc<dyn ChartStateSink>,
    pub navigator: Arc<dyn Navigator>,
    pub notifier: Arc<dyn Notifier>,
    pub handoff: Arc<dyn HandoffStore>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
