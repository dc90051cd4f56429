use async_trait::async_trait;
use std::{convert::TryFrom, sync::Arc};

use crate::{
    Config, WeatherSummary,
    summarizer::anthropic::AnthropicSummarizer,
};

pub mod anthropic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummarizerKind {
    Anthropic,
    Template,
}

impl SummarizerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummarizerKind::Anthropic => "anthropic",
            SummarizerKind::Template => "template",
        }
    }

    pub const fn all() -> &'static [SummarizerKind] {
        &[SummarizerKind::Anthropic, SummarizerKind::Template]
    }
}

impl std::fmt::Display for SummarizerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SummarizerKind {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "anthropic" => Ok(SummarizerKind::Anthropic),
            "template" => Ok(SummarizerKind::Template),
            _ => Err(anyhow::anyhow!(
                "Unknown summarizer '{value}'. Supported summarizers: anthropic, template."
            )),
        }
    }
}

/// Turns a structured summary into free-form advice text.
///
/// The returned text is opaque to the pipeline.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, summary: &WeatherSummary) -> anyhow::Result<String>;
}

/// Construct the summarizer selected in `config`.
pub fn summarizer_from_config(config: &Config) -> anyhow::Result<Arc<dyn Summarizer>> {
    let kind = config.summarizer_kind()?;

    let summarizer: Arc<dyn Summarizer> = match kind {
        SummarizerKind::Template => Arc::new(TemplateSummarizer),
        SummarizerKind::Anthropic => {
            let api_key = config.summarizer_api_key().ok_or_else(|| {
                anyhow::anyhow!(
                    "No API key configured for summarizer '{kind}'.\n\
                     Hint: run `weather configure {kind}` or set ANTHROPIC_API_KEY."
                )
            })?;
            Arc::new(AnthropicSummarizer::new(api_key.to_owned(), &config.summarizer))
        }
    };

    Ok(summarizer)
}

/// Offline summarizer built from fixed rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateSummarizer;

#[async_trait]
impl Summarizer for TemplateSummarizer {
    async fn summarize(&self, summary: &WeatherSummary) -> anyhow::Result<String> {
        Ok(recommend(summary))
    }
}

const UMBRELLA_CHANCE: f64 = 50.0;
const COLD_BELOW: f64 = 10.0;
const HOT_ABOVE: f64 = 30.0;
const GUSTY_FROM: f64 = 50.0;

pub fn recommend(summary: &WeatherSummary) -> String {
    let unit = &summary.units.temperature;
    let mut lines = vec![format!(
        "{}: {}, {}{unit} (feels like {}{unit}).",
        summary.location, summary.conditions, summary.temperature, summary.feels_like
    )];

    let rain_chance = summary
        .outlook
        .and_then(|o| o.max_precipitation_chance)
        .unwrap_or(0.0);

    let mut advice = Vec::new();
    if rain_chance >= UMBRELLA_CHANCE {
        advice.push(format!(
            "Take an umbrella, there is up to a {rain_chance}% chance of rain today."
        ));
    }
    if summary.temperature < COLD_BELOW {
        advice.push("Dress warmly.".to_string());
    }
    if summary.temperature > HOT_ABOVE {
        advice.push("Stay hydrated and avoid the midday sun.".to_string());
    }
    if summary.wind_gust >= GUSTY_FROM {
        advice.push("Expect strong gusts.".to_string());
    }
    if advice.is_empty() {
        advice.push("Conditions look comfortable for being outside.".to_string());
    }

    lines.extend(advice);
    lines.join(" ")
}
