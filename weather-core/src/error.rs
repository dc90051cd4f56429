//! Closed error taxonomy shared by every pipeline step.
//!
//! Steps never raise these; they return them inside an [`Outcome`](crate::Outcome)
//! and boundary adapters decide how each kind is presented.

use std::error::Error as StdError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque diagnostic payload attached to infrastructure failures.
pub type Cause = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum WeatherError {
    /// Bad or missing input; the caller can fix it.
    #[error("{message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Input was well formed but the thing it names does not exist.
    #[error("{resource} not found{}", .id.as_deref().map(|id| format!(": {id}")).unwrap_or_default())]
    NotFound { resource: String, id: Option<String> },

    /// A collaborator was unreachable or answered with unreadable data.
    #[error("{message}")]
    Infrastructure {
        message: String,
        #[source]
        cause: Option<Cause>,
    },

    /// A collaborator answered but rejected the request.
    #[error("{message}")]
    UpstreamApi {
        message: String,
        status_code: Option<u16>,
    },
}

/// Payload-free discriminant of [`WeatherError`], used in response envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Infrastructure,
    UpstreamApi,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Infrastructure => "infrastructure",
            ErrorKind::UpstreamApi => "upstream_api",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-level rejection reported by a collaborator.
///
/// Collaborator adapters raise this inside their `anyhow` chain so the
/// pipeline can tell "reachable but refused" apart from transport faults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("upstream API returned {status}: {reason}")]
pub struct UpstreamFailure {
    pub status: u16,
    pub reason: String,
}

impl WeatherError {
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        WeatherError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        WeatherError::NotFound {
            resource: resource.into(),
            id: Some(id.into()),
        }
    }

    pub fn infrastructure(message: impl Into<String>, cause: impl Into<Cause>) -> Self {
        WeatherError::Infrastructure {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    pub fn upstream(message: impl Into<String>, status_code: Option<u16>) -> Self {
        WeatherError::UpstreamApi {
            message: message.into(),
            status_code,
        }
    }

    /// Classify a failed collaborator call.
    ///
    /// An [`UpstreamFailure`] anywhere in the chain becomes
    /// [`WeatherError::UpstreamApi`]; anything else is an infrastructure fault
    /// whose chain is kept as the opaque cause.
    pub fn from_collaborator(context: &str, error: anyhow::Error) -> Self {
        match error.chain().find_map(|e| e.downcast_ref::<UpstreamFailure>()) {
            Some(failure) => WeatherError::upstream(
                format!("{context}: {}", failure.reason),
                Some(failure.status),
            ),
            None => WeatherError::infrastructure(context, error),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WeatherError::Validation { .. } => ErrorKind::Validation,
            WeatherError::NotFound { .. } => ErrorKind::NotFound,
            WeatherError::Infrastructure { .. } => ErrorKind::Infrastructure,
            WeatherError::UpstreamApi { .. } => ErrorKind::UpstreamApi,
        }
    }

    /// Human-readable message, without any cause detail.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Input field a validation failure refers to.
    pub fn field(&self) -> Option<&str> {
        match self {
            WeatherError::Validation { field, .. } => field.as_deref(),
            _ => None,
        }
    }
}
