//! Hierarchy definitions as supplied by the backend

use serde::{Deserialize, Serialize};

use crate::de::nullable;

/// An ordered drill path over dimension columns of one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyDefinition {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub verbose_name: Option<String>,
    #[serde(alias = "tableId", default)]
    pub table_id: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub columns: Vec<HierarchyColumn>,
}

/// One level of a hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyColumn {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub verbose_name: Option<String>,
    /// Position in the drill sequence; lower drills first
    pub order: i64,
    /// Only groupable columns are offered as drill targets
    #[serde(default)]
    pub groupby: bool,
}

impl HierarchyDefinition {
    /// Display label, preferring the verbose name
    pub fn label(&self) -> &str {
        self.verbose_name
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(&self.name)
    }

    /// Get a column by name
    pub fn get_column(&self, name: &str) -> Option<&HierarchyColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The column the hierarchy starts from
    pub fn first_column(&self) -> Option<&HierarchyColumn> {
        self.columns.first()
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }
}

impl HierarchyColumn {
    pub fn new(id: i64, name: impl Into<String>, order: i64) -> Self {
        Self {
            id,
            name: name.into(),
            verbose_name: None,
            order,
            groupby: true,
        }
    }

    /// Display label, preferring the verbose name
    pub fn label(&self) -> &str {
        self.verbose_name
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(&self.name)
    }
}
