use std::fmt;

use serde::Serialize;

use crate::capability::UnsupportedOperation;
use crate::config::ConfigError;
use crate::engine::{CompileError, EngineError};
use crate::user::SourceName;

/// Message every execution failure is reported under.
pub const DATA_LOADER_ERROR: &str = "dataLoader error";

#[derive(Debug, thiserror::Error)]
pub enum BigQueryError {
    #[error("Failed to plan query on source '{source_name}': {error}")]
    Planning {
        source_name: SourceName,
        #[source]
        error: CompileError,
    },

    #[error("dataLoader error")]
    Execution {
        source_name: SourceName,
        #[source]
        error: EngineError,
    },

    #[error("Query on source '{source_name}' was cancelled")]
    Cancelled { source_name: SourceName },

    #[error(transparent)]
    Unsupported(#[from] UnsupportedOperation),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T, E = BigQueryError> = std::result::Result<T, E>;

impl BigQueryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Planning { .. } => ErrorCode::ValidationFailed,
            Self::Execution { .. } => ErrorCode::BigqueryError,
            Self::Cancelled { .. } => ErrorCode::Cancelled,
            Self::Unsupported(_) => ErrorCode::NotSupported,
            Self::Config(_) => ErrorCode::InvalidConfiguration,
            Self::SerdeJson(_) => ErrorCode::Unexpected,
        }
    }

    /// Structured detail of the underlying failure, if any.
    pub fn detail(&self) -> Option<serde_json::Value> {
        match self {
            Self::Planning { error, .. } => serde_json::to_value(error).ok(),
            Self::Execution { error, .. } => serde_json::to_value(error).ok(),
            _ => None,
        }
    }

    /// Caller facing form of this error.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code(),
            error: self.to_string(),
            internal: self.detail(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    NotSupported,
    ValidationFailed,
    BigqueryError,
    Cancelled,
    InvalidConfiguration,
    Unexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotSupported => "not-supported",
            ErrorCode::ValidationFailed => "validation-failed",
            ErrorCode::BigqueryError => "bigquery-error",
            ErrorCode::Cancelled => "cancelled",
            ErrorCode::InvalidConfiguration => "invalid-configuration",
            ErrorCode::Unexpected => "unexpected",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal: Option<serde_json::Value>,
}
