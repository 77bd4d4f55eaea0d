//! The filter shape shared by charts, dashboards and drilldowns

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{Conjunction, FilterOp};
use crate::de::{is_false, nullable};
use crate::hierarchy::HierarchyColumn;

/// Reserved column carrying the lower time bound of a dashboard
pub const TIME_FROM_COLUMN: &str = "__from";
/// Reserved column carrying the upper time bound of a dashboard
pub const TIME_TO_COLUMN: &str = "__to";

/// A single filter or a group of filters
///
/// A leaf filter has one `col` and a `val`. A group filter has `children`,
/// an empty `col` and no `val`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default, deserialize_with = "nullable")]
    pub col: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<FilterOp>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub val: Value,
    /// Accepts the historical `conjuction` spelling on input
    #[serde(default, alias = "conjuction", skip_serializing_if = "Option::is_none")]
    pub conjunction: Option<Conjunction>,
    /// Generated label of a group or group member; not part of equality
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Filter>>,
    /// Ids of the groups a child belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<String>>,
    /// Hierarchy column whose drilldown produced this filter
    #[serde(rename = "drillDownCol", default, skip_serializing_if = "Option::is_none")]
    pub drill_down_col: Option<String>,
    #[serde(rename = "hierarchyColumn", default, skip_serializing_if = "Option::is_none")]
    pub hierarchy_column: Option<HierarchyColumn>,
    #[serde(
        rename = "isCumulativeTotal",
        alias = "isComulativeTotal",
        default,
        skip_serializing_if = "is_false"
    )]
    pub is_cumulative_total: bool,
    /// Set on filters that restrict a chart to one x-axis period
    #[serde(rename = "isPeriod", default, skip_serializing_if = "is_false")]
    pub is_period: bool,
}

impl Filter {
    /// Create a leaf filter
    pub fn new(col: impl Into<String>, op: FilterOp, val: impl Into<Value>) -> Self {
        Self {
            col: col.into(),
            op: Some(op),
            val: val.into(),
            ..Default::default()
        }
    }

    /// Create an `in` filter over a list of values
    pub fn in_values<I, V>(col: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        Self::new(col, FilterOp::In, Value::Array(values))
    }

    /// Create a group filter with `and` semantics
    pub fn group(children: Vec<Filter>) -> Self {
        Self {
            conjunction: Some(Conjunction::And),
            children: Some(children),
            ..Default::default()
        }
    }

    pub fn is_group(&self) -> bool {
        self.children.is_some()
    }

    /// Check if this filter is one of the reserved dashboard time bounds
    pub fn is_time_bound(&self) -> bool {
        self.col == TIME_FROM_COLUMN || self.col == TIME_TO_COLUMN
    }

    /// Check if the filter constrains anything at all
    ///
    /// Filters without a column and without children are leftovers of
    /// partially configured charts.
    pub fn is_meaningful(&self) -> bool {
        !self.col.is_empty() || self.children.is_some()
    }

    /// First value of the filter: the scalar itself or the head of the list
    pub fn first_value(&self) -> &Value {
        match &self.val {
            Value::Array(values) => values.first().unwrap_or(&Value::Null),
            other => other,
        }
    }

    /// Content equality over `(op, col, val, children)`
    ///
    /// Ids, paths and drilldown bookkeeping are labels, not content.
    pub fn same_content(&self, other: &Filter) -> bool {
        self.op == other.op
            && self.col == other.col
            && self.val == other.val
            && match (&self.children, &other.children) {
                (None, None) => true,
                (Some(a), Some(b)) => {
                    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_content(y))
                }
                _ => false,
            }
    }
}

/// Generate a fresh opaque id for a filter group or member
pub fn new_filter_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
