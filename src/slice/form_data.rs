//! Chart form data as far as drilldowns read and rewrite it

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::drilldown::UrlDrilldown;
use crate::datasource::{DatasourceRef, ParseDatasourceRefError};
use crate::de::nullable;
use crate::filter::Filter;

/// Which dimension list of a chart a drilldown extends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionAttr {
    /// Row grouping
    #[default]
    Groupby,
    /// Column grouping
    Columns,
    /// Flat column list of raw tables
    AllColumns,
}

impl DimensionAttr {
    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionAttr::Groupby => "groupby",
            DimensionAttr::Columns => "columns",
            DimensionAttr::AllColumns => "all_columns",
        }
    }
}

impl fmt::Display for DimensionAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form data of one chart
///
/// Keys without a typed field are preserved in `extra`, so a rewritten form
/// data carries everything the engine does not understand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slice_id: Option<i64>,
    /// `"<id>__<type>"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viz_type: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub filters: Vec<Filter>,
    /// Filters pushed down by the dashboard, including the time bounds
    #[serde(default, deserialize_with = "nullable")]
    pub extra_filters: Vec<Filter>,
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub having: Option<String>,
    /// Time column of the chart
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granularity_sqla: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_grain_sqla: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_dttm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_dttm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub groupby: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub columns: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub all_columns: Vec<String>,
    /// Metric names or adhoc metric objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Vec<Value>>,
    /// Single metric of one-metric charts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<Value>,
    #[serde(default, deserialize_with = "nullable")]
    pub url_drilldowns: Vec<UrlDrilldown>,
    #[serde(default, deserialize_with = "nullable")]
    pub disabled_hierarchy: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
    #[serde(rename = "pointName", default, skip_serializing_if = "Option::is_none")]
    pub point_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FormData {
    /// Get one of the dimension lists
    pub fn dimension(&self, attr: DimensionAttr) -> &[String] {
        match attr {
            DimensionAttr::Groupby => &self.groupby,
            DimensionAttr::Columns => &self.columns,
            DimensionAttr::AllColumns => &self.all_columns,
        }
    }

    /// Replace one of the dimension lists
    pub fn set_dimension(&mut self, attr: DimensionAttr, values: Vec<String>) {
        match attr {
            DimensionAttr::Groupby => self.groupby = values,
            DimensionAttr::Columns => self.columns = values,
            DimensionAttr::AllColumns => self.all_columns = values,
        }
    }

    /// The chart's own filters followed by the dashboard's pushed-down filters
    pub fn active_filters(&self) -> Vec<Filter> {
        self.filters
            .iter()
            .chain(self.extra_filters.iter())
            .cloned()
            .collect()
    }

    /// Find a dashboard filter by column, e.g. one of the time bounds
    pub fn extra_filter(&self, col: &str) -> Option<&Filter> {
        self.extra_filters.iter().find(|f| f.col == col)
    }

    /// Labels of the chart's metrics
    ///
    /// Plain metric names are their own label; adhoc metrics carry a `label`.
    pub fn metric_labels(&self) -> Vec<String> {
        let label = |m: &Value| match m {
            Value::String(s) => Some(s.clone()),
            Value::Object(o) => o.get("label").and_then(Value::as_str).map(str::to_string),
            _ => None,
        };
        match &self.metrics {
            Some(metrics) => metrics.iter().filter_map(label).collect(),
            None => self.metric.iter().filter_map(label).collect(),
        }
    }

    /// Check if a series/column name refers to one of the chart's metrics
    pub fn is_metric(&self, name: &str) -> bool {
        self.metric_labels().iter().any(|m| m == name)
    }

    /// Check if a metric of the chart is displayed as a cumulative total
    pub fn is_cumulative_metric(&self, label: &str) -> bool {
        self.metrics.iter().flatten().any(|m| {
            m.get("label").and_then(Value::as_str) == Some(label)
                && m.get("cumulativeTotal").and_then(Value::as_bool) == Some(true)
        })
    }

    /// Check if a clicked series shows a running total
    ///
    /// Either the series key (or one of its comma-separated parts) is a
    /// cumulative metric, or a cumulative metric carries a URL drilldown.
    pub fn is_cumulative_series(&self, key: &str) -> bool {
        if self.is_cumulative_metric(key.trim())
            || key.split(',').any(|part| self.is_cumulative_metric(part.trim()))
        {
            return true;
        }
        self.url_drilldowns
            .iter()
            .any(|drilldown| self.is_cumulative_metric(&drilldown.field))
    }

    /// Parse the `"<id>__<type>"` datasource reference
    pub fn datasource_ref(&self) -> Result<DatasourceRef, ParseDatasourceRefError> {
        self.datasource.as_deref().unwrap_or_default().parse()
    }
}
