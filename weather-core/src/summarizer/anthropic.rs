use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::SummarizerConfig, error::UpstreamFailure, model::WeatherSummary,
    provider::truncate_body,
};

use super::Summarizer;

const API_VERSION: &str = "2023-06-01";

const SYSTEM_PROMPT: &str = "You are a concise weather assistant. You receive the current \
weather for one place as JSON. Reply in two or three short sentences: describe the weather, \
then give practical advice (clothing, umbrella, outdoor plans). Keep the units you are given. \
Answer in the language of the place name.";

/// Summarizer backed by the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicSummarizer {
    http: Client,
    api_key: String,
    api_url: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicSummarizer {
    pub fn new(api_key: String, config: &SummarizerConfig) -> Self {
        Self {
            http: Client::new(),
            api_key,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<RequestMessage>,
}

#[derive(Debug, Serialize)]
struct RequestMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[async_trait]
impl Summarizer for AnthropicSummarizer {
    async fn summarize(&self, summary: &WeatherSummary) -> Result<String> {
        let payload =
            serde_json::to_string(summary).context("Failed to serialize weather summary")?;

        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: SYSTEM_PROMPT,
            messages: vec![RequestMessage {
                role: "user",
                content: payload,
            }],
        };

        debug!(model = %self.model, location = %summary.location, "requesting summary");

        let res = self
            .http
            .post(format!("{}/messages", self.api_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Anthropic")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Anthropic response body")?;

        if !status.is_success() {
            let reason = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| truncate_body(&body));
            return Err(anyhow!(UpstreamFailure {
                status: status.as_u16(),
                reason,
            }));
        }

        let parsed: MessagesResponse =
            serde_json::from_str(&body).context("Failed to parse Anthropic response JSON")?;

        let text = parsed
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        if text.trim().is_empty() {
            return Err(anyhow!("Anthropic response contained no text"));
        }

        Ok(text)
    }
}
