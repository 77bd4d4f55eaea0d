//! Shared test utilities for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use drillpath::engine::{
    ChartReplacement, ChartStateSink, Collaborators, DashboardDefinition, Navigator, Notifier,
    PreviousSliceState, SliceBackend,
};
use drillpath::{
    parser, ChartKey, DateResolver, DatasourceMeta, DatasourceRef, DrillError, DrillResult,
    DrilldownEngine, EngineConfig, FormData, HierarchyIndex, ManualClock, MemoryHandoffStore,
    SliceContext,
};

/// Load a test fixture from the tests/test_data directory
pub fn load_hierarchies(name: &str) -> HierarchyIndex {
    let path = format!("tests/test_data/{}", name);
    parser::parse_hierarchies_file(&path)
        .unwrap_or_else(|e| panic!("Failed to load test data {}: {}", name, e))
}

pub fn load_config(name: &str) -> EngineConfig {
    let path = format!("tests/test_data/{}", name);
    parser::parse_config_file(&path)
        .unwrap_or_else(|e| panic!("Failed to load test data {}: {}", name, e))
}

/// The instant every test clock starts at: 2024-03-10 12:00:00
pub fn test_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 10)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

pub fn form(value: serde_json::Value) -> FormData {
    serde_json::from_value(value).unwrap()
}

/// Form data of the sales table the tests drill from
pub fn sales_form() -> FormData {
    form(json!({
        "slice_id": 10,
        "datasource": "3__table",
        "viz_type": "table",
        "granularity_sqla": "order_date",
        "groupby": ["country"],
        "metrics": ["count"],
        "filters": [{"col": "product", "op": "in", "val": ["A"]}],
        "extra_filters": [
            {"col": "__from", "op": "in", "val": "7 days ago"},
            {"col": "__to", "op": "in", "val": "now"}
        ],
        "where": "amount > 0"
    }))
}

pub fn sales_context() -> SliceContext {
    SliceContext::new(ChartKey::for_slice(10), sales_form())
}

pub fn datasource(id: i64) -> DatasourceMeta {
    serde_json::from_value(json!({
        "id": id,
        "type": "table",
        "name": format!("table_{}", id),
        "columns": [
            {"column_name": "country", "type": "VARCHAR(64)", "groupby": true},
            {"column_name": "order_date", "type": "DATETIME", "is_dttm": true}
        ]
    }))
    .unwrap()
}

/// In-memory backend with optional gates that hold slice fetches back
#[derive(Default)]
pub struct FakeBackend {
    slices: Mutex<HashMap<i64, FormData>>,
    datasources: Mutex<HashMap<String, DatasourceMeta>>,
    dashboards: Mutex<HashMap<String, DashboardDefinition>>,
    gates: Mutex<HashMap<i64, Arc<Notify>>>,
    requests: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn add_slice(&self, slice_id: i64, form_data: FormData) {
        self.slices.lock().unwrap().insert(slice_id, form_data);
    }

    pub fn add_datasource(&self, reference: &str, meta: DatasourceMeta) {
        self.datasources.lock().unwrap().insert(reference.to_string(), meta);
    }

    pub fn add_dashboard(&self, id: &str, dashboard: DashboardDefinition) {
        self.dashboards.lock().unwrap().insert(id.to_string(), dashboard);
    }

    /// Hold fetches of `slice_id` until the returned gate is notified
    pub fn gate(&self, slice_id: i64) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(slice_id, gate.clone());
        gate
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SliceBackend for FakeBackend {
    async fn slice_form_data(&self, slice_id: i64) -> DrillResult<FormData> {
        self.requests
            .lock()
            .unwrap()
            .push(format!("/slice_formdata/{}", slice_id));
        let gate = self.gates.lock().unwrap().get(&slice_id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.slices
            .lock()
            .unwrap()
            .get(&slice_id)
            .cloned()
            .ok_or_else(|| DrillError::backend(format!("slice {} not found", slice_id)))
    }

    async fn datasource(&self, datasource: &DatasourceRef) -> DrillResult<DatasourceMeta> {
        self.requests
            .lock()
            .unwrap()
            .push(format!("/datasource/{}/{}", datasource.kind, datasource.id));
        self.datasources
            .lock()
            .unwrap()
            .get(&datasource.to_string())
            .cloned()
            .ok_or_else(|| DrillError::backend(format!("datasource {} not found", datasource)))
    }

    async fn dashboard(&self, dashboard_id: &str) -> DrillResult<DashboardDefinition> {
        self.requests
            .lock()
            .unwrap()
            .push(format!("/dashboard/{}/?json=true", dashboard_id));
        self.dashboards
            .lock()
            .unwrap()
            .get(dashboard_id)
            .cloned()
            .ok_or_else(|| DrillError::backend(format!("dashboard {} not found", dashboard_id)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    DashboardState(String, u32),
    SliceState(PreviousSliceState),
    Replace(ChartReplacement),
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn replacements(&self) -> Vec<ChartReplacement> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Replace(r) => Some(r),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChartStateSink for RecordingSink {
    async fn save_dashboard_state(&self, hid: &str, hid_index: u32) {
        self.events
            .lock()
            .unwrap()
            .push(SinkEvent::DashboardState(hid.to_string(), hid_index));
    }

    async fn save_slice_state(&self, state: PreviousSliceState) {
        self.events.lock().unwrap().push(SinkEvent::SliceState(state));
    }

    async fn replace_chart(&self, replacement: ChartReplacement) {
        self.events.lock().unwrap().push(SinkEvent::Replace(replacement));
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    urls: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Navigator for RecordingNavigator {
    async fn navigate(&self, url: &str) {
        self.urls.lock().unwrap().push(url.to_string());
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify_error(&self, error: &DrillError) {
        self.errors.lock().unwrap().push(error.to_string());
    }
}

/// An engine wired to in-memory collaborators and a clock stopped at [`test_now`]
pub struct Harness {
    pub backend: Arc<FakeBackend>,
    pub sink: Arc<RecordingSink>,
    pub navigator: Arc<RecordingNavigator>,
    pub notifier: Arc<RecordingNotifier>,
    pub store: Arc<MemoryHandoffStore>,
    pub clock: Arc<ManualClock>,
    pub engine: DrilldownEngine,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(load_config("engine.yaml"))
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let clock = Arc::new(ManualClock::new(test_now()));
        let backend = Arc::new(FakeBackend::default());
        let sink = Arc::new(RecordingSink::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let store = Arc::new(MemoryHandoffStore::with_clock(
            config.handoff_ttl(),
            config.handoff_read_policy,
            clock.clone(),
        ));
        let collaborators = Collaborators {
            backend: backend.clone(),
            sink: sink.clone(),
            navigator: navigator.clone(),
            notifier: notifier.clone(),
            handoff: store.clone(),
        };
        let engine = DrilldownEngine::new(collaborators, config)
            .with_date_resolver(DateResolver::new(clock.clone()));
        Self {
            backend,
            sink,
            navigator,
            notifier,
            store,
            clock,
            engine,
        }
    }

    /// Register the sales slice and its datasource
    pub fn with_sales(self) -> Self {
        self.backend.add_slice(10, sales_form());
        self.backend.add_datasource("3__table", datasource(3));
        self
    }
}
