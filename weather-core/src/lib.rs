//! Core library for the weather service.
//!
//! This crate defines:
//! - A failure-explicit pipeline (validate → geocode → forecast → format)
//!   built on [`Result`] plus the async helpers in [`outcome`]
//! - The closed error taxonomy boundary adapters map from
//! - Ports for the external lookups, with Open-Meteo and Anthropic adapters
//! - Chat-intent parsing and configuration
//!
//! It is used by `weather-server` and `weather-cli`.

pub mod conditions;
pub mod config;
pub mod error;
pub mod intent;
pub mod model;
pub mod outcome;
pub mod pipeline;
pub mod provider;
pub mod summarizer;

pub use conditions::ConditionTable;
pub use config::Config;
pub use error::{ErrorKind, UpstreamFailure, WeatherError};
pub use intent::parse_place;
pub use model::{GeoLocation, WeatherReport, WeatherSummary};
pub use outcome::{AsyncResultExt, Outcome};
pub use pipeline::WeatherService;
pub use provider::{ForecastSource, Geocoder};
pub use summarizer::{Summarizer, SummarizerKind};
