//! HTTP envelopes and the mapping from pipeline errors to status codes.
//!
//! This is the only place that knows about transport status codes; the
//! pipeline itself stays transport agnostic.

use std::error::Error as _;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use weather_core::{ErrorKind, Outcome, WeatherError};

/// Body of a successful response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessEnvelope<T> {
    pub data: T,
}

/// Body of a failed response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub kind: ErrorKind,
}

pub fn status_for(error: &WeatherError) -> StatusCode {
    match error {
        WeatherError::Validation { .. } => StatusCode::BAD_REQUEST,
        WeatherError::NotFound { .. } => StatusCode::NOT_FOUND,
        WeatherError::UpstreamApi { status_code, .. } => status_code
            .and_then(|code| StatusCode::from_u16(code).ok())
            .filter(|status| status.is_client_error() || status.is_server_error())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        WeatherError::Infrastructure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Terminal pipeline result, rendered as `{data}` or `{error, kind}`.
#[derive(Debug)]
pub struct ApiResponse<T>(pub Outcome<T>);

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self.0 {
            Ok(data) => (StatusCode::OK, Json(SuccessEnvelope { data })).into_response(),
            Err(error) => error_response(&error),
        }
    }
}

pub fn error_response(error: &WeatherError) -> Response {
    let status = status_for(error);

    if status.is_server_error() {
        error!(
            kind = %error.kind(),
            error = %error,
            cause = %cause_chain(error),
            "request failed"
        );
    } else {
        info!(kind = %error.kind(), error = %error, "request rejected");
    }

    let body = ErrorEnvelope {
        error: error.message(),
        kind: error.kind(),
    };
    (status, Json(body)).into_response()
}

/// `a: b: c` rendering of an error's sources, for logs only.
pub(crate) fn cause_chain(error: &WeatherError) -> String {
    let mut parts = Vec::new();
    let mut source = error.source();
    while let Some(e) = source {
        parts.push(e.to_string());
        source = e.source();
    }
    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn validation_is_bad_request() {
        let err = WeatherError::validation("city is required", "city");
        assert_eq!(status_for(&err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_is_404() {
        let err = WeatherError::not_found("location", "Atlantis");
        assert_eq!(status_for(&err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn infrastructure_is_500() {
        let err = WeatherError::infrastructure("geocoding lookup failed", anyhow::anyhow!("dns"));
        assert_eq!(status_for(&err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn upstream_uses_carried_error_status() {
        assert_eq!(
            status_for(&WeatherError::upstream("rate limited", Some(429))),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status_for(&WeatherError::upstream("bad gateway", Some(502))),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn upstream_without_usable_status_is_500() {
        for code in [None, Some(200), Some(302), Some(42)] {
            assert_eq!(
                status_for(&WeatherError::upstream("odd", code)),
                StatusCode::INTERNAL_SERVER_ERROR,
                "status code {code:?}"
            );
        }
    }

    #[tokio::test]
    async fn error_envelope_has_message_and_kind_only() {
        let err = WeatherError::infrastructure(
            "forecast lookup failed",
            anyhow::anyhow!("connection refused at 10.0.0.3"),
        );

        let response = ApiResponse::<()>(Err(err)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(
            body,
            serde_json::json!({"error": "forecast lookup failed", "kind": "infrastructure"})
        );
    }

    #[tokio::test]
    async fn success_envelope_wraps_data() {
        let response = ApiResponse(Ok(serde_json::json!({"location": "Tokyo"}))).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"data": {"location": "Tokyo"}})
        );
    }

    #[test]
    fn cause_chain_lists_sources() {
        let inner = anyhow::anyhow!("refused").context("connect failed");
        let err = WeatherError::infrastructure("geocoding lookup failed", inner);
        let chain = cause_chain(&err);
        assert!(chain.starts_with("connect failed"));
        assert!(chain.contains("refused"));
    }
}
