//! Operator and conjunction definitions for filters

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Comparison operator of a leaf filter
///
/// Operators the engine does not interpret are kept verbatim in `Other`
/// so they survive a round trip through the chart's form data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterOp {
    /// Membership in a list of values
    In,
    /// Exclusion from a list of values
    NotIn,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// Any other operator string
    Other(String),
}

impl FilterOp {
    pub fn as_str(&self) -> &str {
        match self {
            FilterOp::In => "in",
            FilterOp::NotIn => "not in",
            FilterOp::Eq => "==",
            FilterOp::Ne => "!=",
            FilterOp::Le => "<=",
            FilterOp::Ge => ">=",
            FilterOp::Lt => "<",
            FilterOp::Gt => ">",
            FilterOp::Other(op) => op,
        }
    }

    /// Check if the operator takes a list of values
    pub fn is_membership(&self) -> bool {
        matches!(self, FilterOp::In | FilterOp::NotIn)
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for FilterOp {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "in" => FilterOp::In,
            "not in" => FilterOp::NotIn,
            "==" | "=" => FilterOp::Eq,
            "!=" | "<>" => FilterOp::Ne,
            "<=" => FilterOp::Le,
            ">=" => FilterOp::Ge,
            "<" => FilterOp::Lt,
            ">" => FilterOp::Gt,
            _ => FilterOp::Other(s.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for FilterOp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(FilterOp::from(s.as_str()))
    }
}

impl Serialize for FilterOp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// How a filter combines with its siblings inside a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conjunction {
    And,
    Or,
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conjunction::And => write!(f, "and"),
            Conjunction::Or => write!(f, "or"),
        }
    }
}
