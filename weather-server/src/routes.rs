//! Axum router wiring the pipeline to HTTP and the chat webhook.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use weather_core::{AsyncResultExt, WeatherError, WeatherReport, WeatherService};

use crate::{chat, http::ApiResponse, messenger::ChatMessenger};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WeatherService>,
    pub messenger: Arc<dyn ChatMessenger>,
}

impl AppState {
    pub fn new(service: WeatherService, messenger: Arc<dyn ChatMessenger>) -> Self {
        Self {
            service: Arc::new(service),
            messenger,
        }
    }
}

/// `?city=` on GET, `{"city": ...}` on POST.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/weather", get(weather_by_query).post(weather_by_body))
        .route("/webhook", post(chat::webhook))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn weather_by_query(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> ApiResponse<WeatherReport> {
    ApiResponse(state.service.report(query.city.as_deref()).await)
}

async fn weather_by_body(
    State(state): State<AppState>,
    body: Result<Json<WeatherQuery>, JsonRejection>,
) -> ApiResponse<WeatherReport> {
    let outcome = body
        .map(|Json(query)| query)
        .map_err(|rejection| WeatherError::Validation {
            message: rejection.body_text(),
            field: None,
        })
        .and_then_async(|query| async move { state.service.report(query.city.as_deref()).await })
        .await;

    ApiResponse(outcome)
}
