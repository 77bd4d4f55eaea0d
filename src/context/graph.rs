use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::payload::{ClickPayload, GraphEdge};

/// Position of a clicked node in a directed graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphRole {
    /// Only ever starts edges
    Source,
    /// Ends edges and starts none
    Target,
    /// Both starts and ends edges
    Common,
}

impl GraphRole {
    /// Classify a node from its name, whether it carries a value, and the edges
    ///
    /// Nodes without a value of their own are sources. Valued nodes are
    /// common when they appear on both ends of some edge, targets otherwise.
    pub fn classify(name: &Value, has_value: bool, edges: &[GraphEdge]) -> GraphRole {
        if !has_value {
            return GraphRole::Source;
        }
        let is_source = edges.iter().any(|e| &e.source == name);
        let is_target = edges.iter().any(|e| &e.target == name);
        if is_source && is_target {
            GraphRole::Common
        } else {
            GraphRole::Target
        }
    }

    /// Role of the node of a graph click, if the click is on a graph node
    pub fn of_click(click: &ClickPayload) -> Option<GraphRole> {
        match click {
            ClickPayload::GraphNode {
                name,
                has_value,
                edges,
            } => Some(GraphRole::classify(name, *has_value, edges)),
            _ => None,
        }
    }
}
