//! Decoded click events

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named cell of a clicked table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowCell {
    pub name: String,
    pub value: Value,
}

/// One level of a pivot table's row or column header path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotSegment {
    pub column: String,
    pub value: Value,
}

/// A group-by value attached to a map marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerDimension {
    pub column: String,
    pub value: Value,
}

/// An edge of a graph visualization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: Value,
    pub target: Value,
}

/// What the user clicked, already decoded by the chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClickPayload {
    /// Pie and sunburst slices: one value per group-by level
    SlicePath { path: Vec<Value> },
    /// A point of a series: the series key and the x value
    Series {
        key: String,
        #[serde(default)]
        x: Option<Value>,
    },
    /// A table row
    Row { cells: Vec<RowCell> },
    /// A pivot table cell, by its header path
    PivotCell { path: Vec<PivotSegment> },
    /// A map marker
    Marker {
        #[serde(default)]
        groupby: Vec<MarkerDimension>,
        #[serde(default)]
        point_name: Option<Value>,
        /// `[latitude, longitude]`
        #[serde(default)]
        position: Vec<f64>,
    },
    /// A node of a graph
    GraphNode {
        name: Value,
        /// Whether the node carries a metric value of its own
        #[serde(default)]
        has_value: bool,
        #[serde(default)]
        edges: Vec<GraphEdge>,
    },
    /// A single number
    Scalar { value: Value },
}
