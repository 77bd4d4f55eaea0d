//! Datasource metadata and references

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::types::ColumnType;
use crate::de::nullable;

/// A column of a datasource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasourceColumn {
    pub column_name: String,
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
    #[serde(default)]
    pub verbose_name: Option<String>,
    #[serde(default)]
    pub groupby: bool,
    #[serde(default)]
    pub filterable: bool,
    #[serde(default)]
    pub is_dttm: bool,
}

impl DatasourceColumn {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            column_name: name.into(),
            column_type,
            ..Default::default()
        }
    }
}

/// Datasource metadata returned by `GET /datasource/{type}/{id}`
///
/// Keys the engine does not read are kept in `extra` and handed to the
/// chart untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasourceMeta {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub columns: Vec<DatasourceColumn>,
    #[serde(default, deserialize_with = "nullable")]
    pub metrics: Vec<Value>,
    #[serde(default, deserialize_with = "nullable")]
    pub verbose_map: HashMap<String, String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DatasourceMeta {
    /// Get a column by name
    pub fn get_column(&self, name: &str) -> Option<&DatasourceColumn> {
        self.columns.iter().find(|c| c.column_name == name)
    }
}

/// Error when parsing a `"<id>__<type>"` datasource reference
#[derive(Debug, Clone, Error)]
#[error("Invalid datasource reference '{input}': expected '<id>__<type>'")]
pub struct ParseDatasourceRefError {
    pub input: String,
}

/// Reference to a datasource as stored in form data: `"<id>__<type>"`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasourceRef {
    pub id: String,
    pub kind: String,
}

impl FromStr for DatasourceRef {
    type Err = ParseDatasourceRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split("__");
        match (parts.next(), parts.next()) {
            (Some(id), Some(kind)) if !id.is_empty() && !kind.is_empty() => Ok(DatasourceRef {
                id: id.to_string(),
                kind: kind.to_string(),
            }),
            _ => Err(ParseDatasourceRefError {
                input: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DatasourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}__{}", self.id, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_datasource_ref() {
        let r: DatasourceRef = "12__table".parse().unwrap();
        assert_eq!(r.id, "12");
        assert_eq!(r.kind, "table");
        assert_eq!(r.to_string(), "12__table");
    }

    #[test]
    fn test_parse_datasource_ref_errors() {
        assert!("12".parse::<DatasourceRef>().is_err());
        assert!("__table".parse::<DatasourceRef>().is_err());
        assert!("".parse::<DatasourceRef>().is_err());
    }

    #[test]
    fn test_deserialize_meta_keeps_extra_keys() {
        let meta: DatasourceMeta = serde_json::from_value(json!({
            "id": 3,
            "type": "table",
            "columns": [{"column_name": "order_date", "type": "DATE", "is_dttm": true}],
            "metrics": null,
            "edit_url": "/tablemodelview/edit/3"
        }))
        .unwrap();
        assert_eq!(meta.get_column("order_date").unwrap().column_type, ColumnType::Date);
        assert!(meta.metrics.is_empty());
        assert_eq!(meta.extra["edit_url"], json!("/tablemodelview/edit/3"));
    }
}
