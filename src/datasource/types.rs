//! Column type taxonomy of datasource columns

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// SQL type of a datasource column, as reported by the backend
///
/// Only the types that change how a drilldown value is rendered are told
/// apart; everything else is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// `DATE`
    Date,
    /// `Nullable(Date)`
    NullableDate,
    /// `DATETIME`
    DateTime,
    /// `Nullable(DateTime)`
    NullableDateTime,
    /// `TIME`
    Time,
    /// `VARCHAR`, with or without a length
    Varchar,
    /// Any other type string
    Other(String),
}

impl Default for ColumnType {
    fn default() -> Self {
        ColumnType::Other(String::new())
    }
}

impl ColumnType {
    /// chrono pattern a value of this type is rendered with in SQL filters
    pub fn sql_date_format(&self) -> Option<&'static str> {
        match self {
            ColumnType::Date | ColumnType::NullableDate => Some("%Y-%m-%d"),
            ColumnType::DateTime | ColumnType::NullableDateTime => Some("%Y-%m-%dT%H:%M:%S"),
            _ => None,
        }
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, ColumnType::Varchar)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Date => write!(f, "DATE"),
            ColumnType::NullableDate => write!(f, "Nullable(Date)"),
            ColumnType::DateTime => write!(f, "DATETIME"),
            ColumnType::NullableDateTime => write!(f, "Nullable(DateTime)"),
            ColumnType::Time => write!(f, "TIME"),
            ColumnType::Varchar => write!(f, "VARCHAR"),
            ColumnType::Other(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for ColumnType {
    fn from(s: &str) -> Self {
        let upper = s.trim().to_uppercase();

        if upper == "VARCHAR" || (upper.starts_with("VARCHAR(") && upper.ends_with(')')) {
            return ColumnType::Varchar;
        }

        match upper.as_str() {
            "DATE" => ColumnType::Date,
            "NULLABLE(DATE)" => ColumnType::NullableDate,
            "DATETIME" => ColumnType::DateTime,
            "NULLABLE(DATETIME)" => ColumnType::NullableDateTime,
            "TIME" => ColumnType::Time,
            _ => ColumnType::Other(s.to_string()),
        }
    }
}

// Custom deserialize from string; `null` is an unknown type
impl<'de> Deserialize<'de> for ColumnType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?;
        Ok(s.map(|s| ColumnType::from(s.as_str())).unwrap_or_default())
    }
}

impl Serialize for ColumnType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
