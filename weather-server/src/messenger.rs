//! Delivery of chat replies to the messaging platform.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::info;
use weather_core::{Config, config::ChatConfig};

#[async_trait]
pub trait ChatMessenger: Send + Sync {
    async fn reply(&self, reply_token: &str, text: &str) -> Result<()>;
}

/// LINE Messaging API reply endpoint.
#[derive(Debug, Clone)]
pub struct LineMessenger {
    http: Client,
    access_token: String,
    reply_url: String,
}

impl LineMessenger {
    pub fn new(access_token: String, config: &ChatConfig) -> Self {
        Self {
            http: Client::new(),
            access_token,
            reply_url: config.reply_url.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: [TextMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[async_trait]
impl ChatMessenger for LineMessenger {
    async fn reply(&self, reply_token: &str, text: &str) -> Result<()> {
        let request = ReplyRequest {
            reply_token,
            messages: [TextMessage { kind: "text", text }],
        };

        let res = self
            .http
            .post(&self.reply_url)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .context("Failed to send reply to LINE")?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!("LINE reply failed with status {status}: {body}"));
        }

        Ok(())
    }
}

/// Writes replies to the log; used when no channel token is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMessenger;

#[async_trait]
impl ChatMessenger for LogMessenger {
    async fn reply(&self, reply_token: &str, text: &str) -> Result<()> {
        info!(reply_token, text, "chat reply (no messaging channel configured)");
        Ok(())
    }
}

pub fn messenger_from_config(config: &Config) -> Arc<dyn ChatMessenger> {
    match config
        .chat
        .channel_access_token
        .as_deref()
        .filter(|token| !token.trim().is_empty())
    {
        Some(token) => Arc::new(LineMessenger::new(token.to_owned(), &config.chat)),
        None => Arc::new(LogMessenger),
    }
}
