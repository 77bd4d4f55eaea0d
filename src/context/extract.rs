//! Click-to-filter extraction per visualization kind

use serde_json::Value;

use super::payload::ClickPayload;
use super::period::{grain_bounds, point_filter};
use crate::filter::{Conjunction, Filter, FilterOp};
use crate::slice::FormData;

/// Turns a click on a chart into the filters it implies
pub trait ContextExtractor: Send + Sync {
    fn extract(&self, click: &ClickPayload, form: &FormData) -> Vec<Filter>;

    /// Bounds of the clicked period, applied on top of the composed filters
    fn period_filters(&self, _click: &ClickPayload, _form: &FormData) -> Vec<Filter> {
        Vec::new()
    }
}

/// Family of visualizations sharing one click-to-filter rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VizKind {
    Pie,
    Series,
    Table,
    PivotTable,
    Map,
    Graph,
    BigNumber,
}

impl VizKind {
    /// Classify a chart by its `viz_type`
    pub fn from_viz_type(viz_type: &str) -> Option<VizKind> {
        let kind = match viz_type {
            "pie" | "sunburst" => VizKind::Pie,
            "line" | "area" | "bar" | "dist_bar" | "dual_line" | "line_multi" | "compare"
            | "time_pivot" | "box_plot" => VizKind::Series,
            "table" => VizKind::Table,
            "pivot_table" => VizKind::PivotTable,
            "bubble_map" | "country_map" | "world_map" | "mapbox" | "deck_scatter" => VizKind::Map,
            "directed_force" | "sankey" | "chord" => VizKind::Graph,
            "big_number" | "big_number_total" => VizKind::BigNumber,
            _ => return None,
        };
        Some(kind)
    }

    /// The extractor for this kind of chart
    pub fn extractor(self) -> &'static dyn ContextExtractor {
        match self {
            VizKind::Pie => &PieExtractor,
            VizKind::Series => &SeriesExtractor,
            VizKind::Table => &TableExtractor,
            VizKind::PivotTable => &PivotExtractor,
            VizKind::Map => &MapExtractor,
            VizKind::Graph => &GraphExtractor,
            VizKind::BigNumber => &NoContext,
        }
    }
}

/// Charts whose x axis is the time column
const TEMPORAL_SERIES: &[&str] = &[
    "line",
    "area",
    "bar",
    "dual_line",
    "line_multi",
    "compare",
    "time_pivot",
];

fn trimmed(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.trim().to_string()),
        other => other.clone(),
    }
}

fn positional(columns: &[String], values: impl IntoIterator<Item = Value>) -> Vec<Filter> {
    columns
        .iter()
        .zip(values)
        .map(|(col, value)| Filter::in_values(col.clone(), [trimmed(&value)]))
        .collect()
}

/// Pie slices: path values map onto `groupby` by position
pub struct PieExtractor;

impl ContextExtractor for PieExtractor {
    fn extract(&self, click: &ClickPayload, form: &FormData) -> Vec<Filter> {
        match click {
            ClickPayload::SlicePath { path } => positional(&form.groupby, path.iter().cloned()),
            _ => Vec::new(),
        }
    }
}

/// Points of line and bar charts
///
/// The series key is split on `,` and, with metric names removed, mapped
/// onto `groupby` for time series or onto `columns` for categorical bars.
/// On a time series the x value pins the time column: with a time grain
/// as a period range (see [`ContextExtractor::period_filters`]), without
/// one as a point filter, `<=` when the series is a cumulative total.
/// Categorical charts turn the x value into a `groupby` filter.
pub struct SeriesExtractor;

impl SeriesExtractor {
    fn is_temporal(form: &FormData) -> bool {
        form.viz_type
            .as_deref()
            .is_some_and(|viz| TEMPORAL_SERIES.contains(&viz))
    }

    /// Bucket bounds of a time-grained temporal click, if any
    fn grain_filters(key: &str, x: &Value, form: &FormData) -> Option<Vec<Filter>> {
        if !Self::is_temporal(form) {
            return None;
        }
        let time_col = form.granularity_sqla.as_deref()?;
        let grain = form.time_grain_sqla.as_deref()?;
        grain_bounds(time_col, x, grain, form.is_cumulative_series(key))
    }
}

impl ContextExtractor for SeriesExtractor {
    fn extract(&self, click: &ClickPayload, form: &FormData) -> Vec<Filter> {
        let ClickPayload::Series { key, x } = click else {
            return Vec::new();
        };
        let parts: Vec<Value> = key
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty() && !form.is_metric(part))
            .map(|part| Value::String(part.to_string()))
            .collect();

        let mut filters = Vec::new();
        if Self::is_temporal(form) {
            filters.extend(positional(&form.groupby, parts));
            if let (Some(time_col), Some(x)) = (&form.granularity_sqla, x) {
                if Self::grain_filters(key, x, form).is_none() {
                    filters.push(point_filter(time_col, x, form.is_cumulative_series(key)));
                }
            }
        } else {
            if let Some(x) = x {
                filters.extend(positional(&form.groupby, [x.clone()]));
            }
            filters.extend(positional(&form.columns, parts));
        }
        filters
    }

    fn period_filters(&self, click: &ClickPayload, form: &FormData) -> Vec<Filter> {
        match click {
            ClickPayload::Series { key, x: Some(x) } => {
                Self::grain_filters(key, x, form).unwrap_or_default()
            }
            _ => Vec::new(),
        }
    }
}

/// Table rows: one filter per dimension column present in the row
pub struct TableExtractor;

impl ContextExtractor for TableExtractor {
    fn extract(&self, click: &ClickPayload, form: &FormData) -> Vec<Filter> {
        let ClickPayload::Row { cells } = click else {
            return Vec::new();
        };
        let dimensions = if form.groupby.is_empty() {
            &form.all_columns
        } else {
            &form.groupby
        };
        dimensions
            .iter()
            .filter_map(|col| {
                let cell = cells.iter().find(|c| &c.name == col)?;
                Some(Filter::in_values(col.clone(), [cell.value.clone()]))
            })
            .collect()
    }
}

/// Pivot cells: one filter per header level
pub struct PivotExtractor;

impl ContextExtractor for PivotExtractor {
    fn extract(&self, click: &ClickPayload, _form: &FormData) -> Vec<Filter> {
        match click {
            ClickPayload::PivotCell { path } => path
                .iter()
                .filter(|segment| !segment.column.is_empty())
                .map(|segment| Filter::in_values(segment.column.clone(), [trimmed(&segment.value)]))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Map markers: group-by values, the point name and the coordinates
///
/// Values for a repeated column are merged into one filter.
pub struct MapExtractor;

impl ContextExtractor for MapExtractor {
    fn extract(&self, click: &ClickPayload, form: &FormData) -> Vec<Filter> {
        let ClickPayload::Marker {
            groupby,
            point_name,
            position,
        } = click
        else {
            return Vec::new();
        };

        let mut pairs: Vec<(String, Value)> = groupby
            .iter()
            .map(|d| (d.column.clone(), d.value.clone()))
            .collect();
        if let (Some(col), Some(name)) = (&form.point_name, point_name) {
            pairs.push((col.clone(), name.clone()));
        }
        for (index, coordinate) in position.iter().enumerate().take(2) {
            let col = if index == 0 {
                &form.latitude
            } else {
                &form.longitude
            };
            if let Some(col) = col {
                pairs.push((col.clone(), Value::from(*coordinate)));
            }
        }

        let mut filters: Vec<Filter> = Vec::new();
        for (col, value) in pairs {
            match filters.iter_mut().find(|f| f.col == col) {
                Some(existing) => {
                    if let Value::Array(values) = &mut existing.val {
                        if !values.contains(&value) {
                            values.push(value);
                        }
                    }
                }
                None => filters.push(Filter::in_values(col, [value])),
            }
        }
        filters
    }
}

/// Graph nodes: one group matching the node name on any group-by column
pub struct GraphExtractor;

impl ContextExtractor for GraphExtractor {
    fn extract(&self, click: &ClickPayload, form: &FormData) -> Vec<Filter> {
        let ClickPayload::GraphNode { name, .. } = click else {
            return Vec::new();
        };
        if form.groupby.is_empty() {
            return Vec::new();
        }
        let children = form
            .groupby
            .iter()
            .map(|col| Filter {
                conjunction: Some(Conjunction::Or),
                ..Filter::in_values(col.clone(), [name.clone()])
            })
            .collect();
        vec![Filter {
            op: Some(FilterOp::In),
            ..Filter::group(children)
        }]
    }
}

/// Charts without drillable elements
pub struct NoContext;

impl ContextExtractor for NoContext {
    fn extract(&self, _click: &ClickPayload, _form: &FormData) -> Vec<Filter> {
        Vec::new()
    }
}
