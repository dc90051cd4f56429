use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::OpenMeteoConfig,
    error::UpstreamFailure,
    model::{ForecastReading, GeoLocation, Outlook, Units},
    provider::truncate_body,
};

use super::{ForecastSource, Geocoder};

const CURRENT_FIELDS: &str = "temperature_2m,apparent_temperature,relative_humidity_2m,\
                              wind_speed_10m,wind_gusts_10m,weather_code";
const HOURLY_FIELDS: &str = "temperature_2m,precipitation_probability";

/// Open-Meteo geocoding and forecast APIs. Both are keyless.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: Client,
    geocoding_url: String,
    forecast_url: String,
    language: String,
}

impl OpenMeteoClient {
    pub fn new(config: &OpenMeteoConfig) -> Self {
        Self {
            http: Client::new(),
            geocoding_url: config.geocoding_url.clone(),
            forecast_url: config.forecast_url.clone(),
            language: config.language.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OmSearchResponse {
    #[serde(default)]
    results: Vec<OmPlace>,
}

#[derive(Debug, Deserialize)]
struct OmPlace {
    name: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    time: Option<String>,
    temperature_2m: f64,
    apparent_temperature: f64,
    relative_humidity_2m: f64,
    wind_speed_10m: f64,
    wind_gusts_10m: f64,
    weather_code: i32,
}

#[derive(Debug, Deserialize)]
struct OmCurrentUnits {
    temperature_2m: Option<String>,
    relative_humidity_2m: Option<String>,
    wind_speed_10m: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OmHourly {
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    current: OmCurrent,
    current_units: Option<OmCurrentUnits>,
    hourly: Option<OmHourly>,
}

#[derive(Debug, Deserialize)]
struct OmErrorBody {
    reason: String,
}

#[async_trait]
impl Geocoder for OpenMeteoClient {
    async fn search(&self, name: &str) -> Result<Vec<GeoLocation>> {
        debug!(name, "querying Open-Meteo geocoding");

        let res = self
            .http
            .get(&self.geocoding_url)
            .query(&[
                ("name", name),
                ("count", "1"),
                ("language", self.language.as_str()),
                ("format", "json"),
            ])
            .send()
            .await
            .context("Failed to send request to Open-Meteo (geocoding)")?;

        let body = read_success_body(res, "geocoding").await?;

        let parsed: OmSearchResponse =
            serde_json::from_str(&body).context("Failed to parse Open-Meteo geocoding JSON")?;

        Ok(parsed
            .results
            .into_iter()
            .map(|p| GeoLocation {
                latitude: p.latitude,
                longitude: p.longitude,
                canonical_name: p.name,
            })
            .collect())
    }
}

#[async_trait]
impl ForecastSource for OpenMeteoClient {
    async fn current(&self, latitude: f64, longitude: f64) -> Result<ForecastReading> {
        debug!(latitude, longitude, "querying Open-Meteo forecast");

        let res = self
            .http
            .get(&self.forecast_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("forecast_days", "1".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .context("Failed to send request to Open-Meteo (forecast)")?;

        let body = read_success_body(res, "forecast").await?;

        let parsed: OmForecastResponse =
            serde_json::from_str(&body).context("Failed to parse Open-Meteo forecast JSON")?;

        let observed_at = parsed
            .current
            .time
            .as_deref()
            .and_then(|t| NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M").ok());

        let units = parsed
            .current_units
            .map(|u| {
                let defaults = Units::default();
                Units {
                    temperature: u.temperature_2m.unwrap_or(defaults.temperature),
                    humidity: u.relative_humidity_2m.unwrap_or(defaults.humidity),
                    wind_speed: u.wind_speed_10m.unwrap_or(defaults.wind_speed),
                }
            })
            .unwrap_or_default();

        Ok(ForecastReading {
            temperature: parsed.current.temperature_2m,
            feels_like: parsed.current.apparent_temperature,
            humidity: parsed.current.relative_humidity_2m,
            wind_speed: parsed.current.wind_speed_10m,
            wind_gust: parsed.current.wind_gusts_10m,
            condition_code: parsed.current.weather_code,
            observed_at,
            units,
            outlook: parsed.hourly.as_ref().and_then(outlook_from_hourly),
        })
    }
}

/// Read the body, turning a non-2xx answer into an error.
///
/// Open-Meteo reports rejected parameters as `{"error": true, "reason": ".."}`;
/// those become an [`UpstreamFailure`] carrying the status.
async fn read_success_body(res: Response, what: &str) -> Result<String> {
    let status = res.status();
    let body = res
        .text()
        .await
        .with_context(|| format!("Failed to read Open-Meteo {what} response body"))?;

    if status.is_success() {
        return Ok(body);
    }

    match serde_json::from_str::<OmErrorBody>(&body) {
        Ok(err) => Err(anyhow!(UpstreamFailure {
            status: status.as_u16(),
            reason: err.reason,
        })),
        Err(_) => Err(anyhow!(
            "Open-Meteo {what} request failed with status {}: {}",
            status,
            truncate_body(&body),
        )),
    }
}

fn outlook_from_hourly(hourly: &OmHourly) -> Option<Outlook> {
    let temps: Vec<f64> = hourly
        .temperature_2m
        .iter()
        .flatten()
        .copied()
        .filter(|t| t.is_finite())
        .collect();

    let min_temperature = temps.iter().copied().reduce(f64::min)?;
    let max_temperature = temps.iter().copied().reduce(f64::max)?;

    let max_precipitation_chance = hourly
        .precipitation_probability
        .iter()
        .flatten()
        .copied()
        .filter(|p| p.is_finite())
        .reduce(f64::max);

    Some(Outlook {
        min_temperature,
        max_temperature,
        max_precipitation_chance,
    })
}
