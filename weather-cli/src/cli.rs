use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, Text};
use tracing::debug;
use weather_core::{Config, SummarizerKind, WeatherReport, WeatherService, parse_place};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the summarizer, e.g. "anthropic" or "template".
    Configure {
        summarizer: String,
    },

    /// Show weather for a place.
    Show {
        /// Place name, e.g. "Tokyo".
        city: String,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Ask in free text, e.g. "東京の天気" or "weather in Paris".
    Ask {
        message: String,

        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { summarizer } => {
                let kind = SummarizerKind::try_from(summarizer.as_str())?;
                configure(self.config, kind)
            }
            Command::Show { city, json } => show(self.config, &city, json).await,
            Command::Ask { message, json } => {
                let city = parse_place(&message)?;
                debug!(%city, "place parsed from message");
                show(self.config, &city, json).await
            }
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
}

fn configure(path: Option<PathBuf>, kind: SummarizerKind) -> anyhow::Result<()> {
    let mut config = match &path {
        Some(p) if p.exists() => Config::load_from(p)?,
        Some(_) => Config::default(),
        None => Config::load()?,
    };

    let api_key = match kind {
        SummarizerKind::Template => None,
        SummarizerKind::Anthropic => {
            let key = Password::new("Anthropic API key:")
                .without_confirmation()
                .prompt()
                .context("Failed to read API key")?;
            let model = Text::new("Model:")
                .with_default(&config.summarizer.model)
                .prompt()
                .context("Failed to read model name")?;
            config.summarizer.model = model;
            Some(key)
        }
    };

    config.upsert_summarizer(kind, api_key);

    let target = match path {
        Some(p) => p,
        None => Config::config_file_path()?,
    };
    config.save_to(&target)?;

    println!("Summarizer set to '{kind}'. Config saved to {}", target.display());
    Ok(())
}

async fn show(path: Option<PathBuf>, city: &str, json: bool) -> anyhow::Result<()> {
    let config = load_config(path.as_ref())?;
    let service = WeatherService::from_config(&config)?;
    debug!(city, "looking up weather");

    // A typed pipeline failure becomes an anyhow error for the terminal here.
    let report = service.report(Some(city)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render(&report));
    }

    Ok(())
}

fn render(report: &WeatherReport) -> String {
    let s = &report.summary;
    let u = &s.units;

    let mut out = format!(
        "{} ({:.2}, {:.2})\n  {}\n  Temperature: {}{} (feels like {}{})\n  Humidity:    {}{}\n  Wind:        {} {} (gusts {} {})\n",
        s.location,
        s.latitude,
        s.longitude,
        s.conditions,
        s.temperature,
        u.temperature,
        s.feels_like,
        u.temperature,
        s.humidity,
        u.humidity,
        s.wind_speed,
        u.wind_speed,
        s.wind_gust,
        u.wind_speed,
    );

    if let Some(o) = s.outlook {
        out.push_str(&format!(
            "  Today:       {}{} to {}{}",
            o.min_temperature, u.temperature, o.max_temperature, u.temperature
        ));
        if let Some(chance) = o.max_precipitation_chance {
            out.push_str(&format!(", rain up to {chance}%"));
        }
        out.push('\n');
    }
    if let Some(at) = s.observed_at {
        out.push_str(&format!("  Observed:    {}\n", at.format("%Y-%m-%d %H:%M")));
    }

    out.push_str(&format!("\n{}\n", report.recommendation));
    out
}
