//! Merging of chart, dashboard and click filters

use serde_json::Value;
use tracing::debug;

use super::convert::convert_for_sql;
use crate::datasource::{ColumnType, DatasourceColumn};
use crate::filter::{new_filter_id, Conjunction, Filter, FilterOp};

/// Value of a context filter meaning "no restriction"
pub const DEFAULT_ALL_LABEL: &str = "All";

/// Remove repeated filters, keeping the first of each
///
/// Two filters repeat each other when their `(op, col, val, children)`
/// content is equal.
pub fn dedup(filters: Vec<Filter>) -> Vec<Filter> {
    let mut out: Vec<Filter> = Vec::with_capacity(filters.len());
    for filter in filters {
        if !out.iter().any(|kept| kept.same_content(&filter)) {
            out.push(filter);
        }
    }
    out
}

/// Merges existing filters with the filters implied by a click
#[derive(Debug, Clone)]
pub struct FilterComposer {
    columns: Vec<DatasourceColumn>,
    all_label: String,
}

impl Default for FilterComposer {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl FilterComposer {
    /// Create a composer converting values by the given datasource columns
    pub fn new(columns: Vec<DatasourceColumn>) -> Self {
        Self {
            columns,
            all_label: DEFAULT_ALL_LABEL.to_string(),
        }
    }

    /// Use a different "no restriction" sentinel
    pub fn with_all_label(mut self, all_label: impl Into<String>) -> Self {
        self.all_label = all_label.into();
        self
    }

    pub fn all_label(&self) -> &str {
        &self.all_label
    }

    /// Merge `existing` filters with `context` filters
    ///
    /// Time bounds are removed from `existing` and the rest normalized to
    /// membership tests. Context filters meaning "All" are ignored, the rest
    /// translated to a single value each. When any context filter is a
    /// cumulative total it replaces everything else. The result is
    /// deduplicated.
    pub fn compose(&self, existing: &[Filter], context: &[Filter]) -> Vec<Filter> {
        let existing: Vec<Filter> = existing
            .iter()
            .filter(|f| !f.is_time_bound())
            .map(normalize)
            .collect();

        let context: Vec<Filter> = context
            .iter()
            .filter(|f| !self.is_all(f))
            .map(|f| self.translate(f))
            .collect();

        let merged = if context.iter().any(|f| f.is_cumulative_total) {
            debug!("composer: cumulative total context replaces {} filters", existing.len());
            context
        } else {
            existing.into_iter().chain(context).collect()
        };

        dedup(merged)
    }

    /// Translate one context filter into its canonical form
    pub fn translate(&self, filter: &Filter) -> Filter {
        match &filter.children {
            Some(children) => {
                let group_id = new_filter_id();
                let children = children
                    .iter()
                    .map(|child| Filter {
                        id: Some(new_filter_id()),
                        path: Some(vec![group_id.clone()]),
                        conjunction: Some(Conjunction::Or),
                        ..self.translate(child)
                    })
                    .collect();
                Filter {
                    col: String::new(),
                    val: Value::Null,
                    id: Some(group_id),
                    conjunction: Some(Conjunction::And),
                    children: Some(children),
                    ..filter.clone()
                }
            }
            None => {
                let value = convert_for_sql(filter.first_value(), &self.column_type(&filter.col));
                let (op, val) = if filter.is_cumulative_total {
                    (FilterOp::Le, value)
                } else {
                    (FilterOp::In, Value::Array(vec![value]))
                };
                Filter {
                    op: Some(op),
                    val,
                    ..filter.clone()
                }
            }
        }
    }

    fn column_type(&self, col: &str) -> ColumnType {
        self.columns
            .iter()
            .find(|c| c.column_name == col)
            .map(|c| c.column_type.clone())
            .unwrap_or_default()
    }

    fn is_all(&self, filter: &Filter) -> bool {
        match &filter.val {
            Value::String(s) => *s == self.all_label,
            Value::Array(values) => {
                values.len() == 1 && values[0].as_str() == Some(self.all_label.as_str())
            }
            _ => false,
        }
    }
}

/// Turn an existing leaf filter without an operator, or with `in`, into a
/// membership test over a list
fn normalize(filter: &Filter) -> Filter {
    if filter.is_group() {
        return filter.clone();
    }
    match &filter.op {
        None | Some(FilterOp::In) => {
            let val = match &filter.val {
                Value::Array(_) => filter.val.clone(),
                Value::Null => Value::Array(Vec::new()),
                scalar => Value::Array(vec![scalar.clone()]),
            };
            Filter {
                op: Some(FilterOp::In),
                val,
                ..filter.clone()
            }
        }
        Some(_) => filter.clone(),
    }
}
