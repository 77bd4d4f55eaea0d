//! Error types for drillpath

use thiserror::Error;

use crate::datasource::ParseDatasourceRefError;

/// Errors that can occur while loading configuration or hierarchy payloads
#[derive(Debug, Error)]
pub enum ParseError {
    /// IO error reading file
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// YAML deserialization error
    #[error("Invalid YAML: {source}")]
    Yaml {
        #[from]
        source: serde_yaml::Error,
    },
    /// JSON deserialization error
    #[error("Invalid JSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        ParseError::Io {
            path: String::new(),
            source: err,
        }
    }
}

/// Errors that abort a drilldown
#[derive(Debug, Clone, Error)]
pub enum DrillError {
    /// A backend or host collaborator failed
    #[error("Backend request failed: {message}")]
    Backend { message: String },
    /// A form data carried a malformed `"<id>__<type>"` datasource reference
    #[error("Invalid datasource reference '{value}'")]
    InvalidDatasource { value: String },
    /// The chart has no slice id to drill from
    #[error("Chart '{chart_key}' has no slice id")]
    MissingSlice { chart_key: String },
    /// A URL drilldown points at nothing usable
    #[error("Invalid drilldown target '{value}'")]
    InvalidTarget { value: String },
    /// A handoff payload could not be written
    #[error("Handoff failed: {message}")]
    Handoff { message: String },
}

impl DrillError {
    pub fn backend(message: impl Into<String>) -> Self {
        DrillError::Backend {
            message: message.into(),
        }
    }

    pub fn handoff(message: impl Into<String>) -> Self {
        DrillError::Handoff {
            message: message.into(),
        }
    }
}

impl From<ParseDatasourceRefError> for DrillError {
    fn from(err: ParseDatasourceRefError) -> Self {
        DrillError::InvalidDatasource { value: err.input }
    }
}

/// Result of a drilldown step
pub type DrillResult<T> = Result<T, DrillError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drill_error_messages() {
        let err: DrillError = "nope".parse::<crate::datasource::DatasourceRef>().unwrap_err().into();
        assert_eq!(err.to_string(), "Invalid datasource reference 'nope'");
        assert_eq!(
            DrillError::backend("502 Bad Gateway").to_string(),
            "Backend request failed: 502 Bad Gateway"
        );
    }

    #[test]
    fn test_io_error_keeps_path() {
        let err = ParseError::Io {
            path: "drillpath.yaml".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "Failed to read 'drillpath.yaml': missing");
    }
}
