//! Where a drilldown starts from

use crate::datasource::DatasourceColumn;
use crate::handoff::HandoffKey;
use crate::slice::{ChartKey, FormData};

/// Handoff parameters of the current page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContext {
    /// History id shared by a chain of dashboard drilldowns
    pub hid: Option<String>,
    /// Position in that chain
    pub hid_index: Option<u32>,
    /// Key of the dashboard data handed over by the previous page
    pub data_key: Option<HandoffKey>,
}

impl PageContext {
    /// Read `hid`, `hid_index` and `data_key` from a query string
    ///
    /// Unknown parameters are ignored and an unparseable `hid_index` counts
    /// as absent.
    pub fn from_query(query: &str) -> Self {
        let mut page = PageContext::default();
        let query = query.trim_start_matches('?');
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            if value.is_empty() {
                continue;
            }
            match name {
                "hid" => page.hid = Some(value.to_string()),
                "hid_index" => page.hid_index = value.parse().ok(),
                "data_key" => page.data_key = Some(HandoffKey::from(value)),
                _ => {}
            }
        }
        page
    }
}

/// The chart a click came from
#[derive(Debug, Clone, PartialEq)]
pub struct SliceContext {
    pub chart_key: ChartKey,
    pub form_data: FormData,
    /// States pushed by earlier drilldowns on this chart, oldest first
    pub previous_states: Vec<FormData>,
    /// Columns of the chart's datasource
    pub columns: Vec<DatasourceColumn>,
    pub page: PageContext,
}

impl SliceContext {
    pub fn new(chart_key: ChartKey, form_data: FormData) -> Self {
        Self {
            chart_key,
            form_data,
            previous_states: Vec::new(),
            columns: Vec::new(),
            page: PageContext::default(),
        }
    }

    pub fn with_previous_states(mut self, previous_states: Vec<FormData>) -> Self {
        self.previous_states = previous_states;
        self
    }

    pub fn with_columns(mut self, columns: Vec<DatasourceColumn>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_page(mut self, page: PageContext) -> Self {
        self.page = page;
        self
    }

    /// Slice id of the chart, from its form data or else its chart key
    pub fn slice_id(&self) -> Option<i64> {
        self.form_data.slice_id.or_else(|| self.chart_key.slice_id())
    }

    /// Slice the current drill chain started from
    pub fn root_slice_id(&self) -> Option<i64> {
        self.previous_states
            .last()
            .and_then(|state| state.slice_id)
            .or_else(|| self.slice_id())
    }
}
