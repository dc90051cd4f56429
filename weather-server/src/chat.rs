//! Chat boundary: webhook payloads in, plain-text replies out.
//!
//! Replies never contain error messages or causes; failures map to one of
//! two fixed texts.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error, warn};
use weather_core::{
    AsyncResultExt, Outcome, WeatherError, WeatherReport, WeatherService, parse_place,
};

use crate::{http::cause_chain, routes::AppState};

pub const APOLOGY: &str =
    "Sorry, I couldn't get the weather right now. Please try again in a little while.";

pub const USAGE_HINT: &str =
    "Ask me about the weather with a place name, for example 「東京の天気」 or \"weather in Paris\".";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub reply_token: Option<String>,
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub text: Option<String>,
}

impl WebhookPayload {
    /// `(reply_token, text)` for every text message that can be answered.
    pub fn text_messages(&self) -> impl Iterator<Item = (&str, &str)> {
        self.events
            .iter()
            .filter(|event| event.kind == "message")
            .filter_map(|event| {
                let message = event.message.as_ref().filter(|m| m.kind == "text")?;
                Some((event.reply_token.as_deref()?, message.text.as_deref()?))
            })
    }
}

pub fn format_report(report: &WeatherReport) -> String {
    let s = &report.summary;
    let u = &s.units;

    let mut lines = vec![
        s.location.clone(),
        s.conditions.clone(),
        format!(
            "Temperature: {}{} (feels like {}{})",
            s.temperature, u.temperature, s.feels_like, u.temperature
        ),
        format!("Humidity: {}{}", s.humidity, u.humidity),
        format!(
            "Wind: {} {} (gusts {} {})",
            s.wind_speed, u.wind_speed, s.wind_gust, u.wind_speed
        ),
    ];

    if let Some(outlook) = s.outlook {
        let mut line = format!(
            "Today: {}{} to {}{}",
            outlook.min_temperature, u.temperature, outlook.max_temperature, u.temperature
        );
        if let Some(chance) = outlook.max_precipitation_chance {
            line.push_str(&format!(", rain up to {chance}%"));
        }
        lines.push(line);
    }

    lines.push(String::new());
    lines.push(report.recommendation.clone());
    lines.join("\n")
}

/// Validation failures get [`USAGE_HINT`] instead of the apology; every other
/// error gets [`APOLOGY`].
pub fn reply_text(outcome: &Outcome<WeatherReport>) -> String {
    match outcome {
        Ok(report) => format_report(report),
        Err(WeatherError::Validation { .. }) => USAGE_HINT.to_string(),
        Err(
            WeatherError::NotFound { .. }
            | WeatherError::Infrastructure { .. }
            | WeatherError::UpstreamApi { .. },
        ) => APOLOGY.to_string(),
    }
}

/// Parse the message, run the report pipeline, and render the reply.
pub async fn answer(service: &WeatherService, message: &str) -> String {
    let outcome = parse_place(message)
        .and_then_async(|place| async move { service.report(Some(&place)).await })
        .await;

    match &outcome {
        Ok(report) => debug!(location = %report.summary.location, "chat report ready"),
        Err(e @ (WeatherError::Infrastructure { .. } | WeatherError::UpstreamApi { .. })) => {
            error!(kind = %e.kind(), error = %e, cause = %cause_chain(e), "chat lookup failed")
        }
        Err(e) => debug!(kind = %e.kind(), error = %e, "chat lookup rejected"),
    }

    reply_text(&outcome)
}

/// Messaging-platform webhook. Always acknowledges so events are not redelivered.
pub async fn webhook(
    State(state): State<AppState>,
    body: Result<Json<WebhookPayload>, JsonRejection>,
) -> Json<Value> {
    let payload = match body {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            warn!(
                status = %rejection.status(),
                error = %rejection.body_text(),
                "ignoring unreadable webhook body"
            );
            WebhookPayload::default()
        }
    };

    for (reply_token, text) in payload.text_messages() {
        let reply = answer(&state.service, text).await;

        if let Err(e) = state.messenger.reply(reply_token, &reply).await {
            warn!(error = %e, "failed to deliver chat reply");
        }
    }

    Json(json!({ "status": "ok" }))
}
