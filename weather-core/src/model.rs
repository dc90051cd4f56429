use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Validated, trimmed, non-empty place name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceName(String);

impl PlaceName {
    pub(crate) fn new_unchecked(name: String) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlaceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A geocoding candidate; the first one returned becomes the request's location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub canonical_name: String,
}

/// Unit labels as reported by the forecast source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Units {
    pub temperature: String,
    pub humidity: String,
    pub wind_speed: String,
}

impl Default for Units {
    fn default() -> Self {
        Self {
            temperature: "°C".to_string(),
            humidity: "%".to_string(),
            wind_speed: "km/h".to_string(),
        }
    }
}

/// Same-day extremes derived from hourly data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outlook {
    pub min_temperature: f64,
    pub max_temperature: f64,
    /// Peak precipitation probability, in percent.
    pub max_precipitation_chance: Option<f64>,
}

/// What the forecast collaborator reports for a pair of coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastReading {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_gust: f64,
    pub condition_code: i32,
    pub observed_at: Option<NaiveDateTime>,
    pub units: Units,
    pub outlook: Option<Outlook>,
}

/// Forecast reading bound to the location it was requested for.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSnapshot {
    pub location: GeoLocation,
    pub reading: ForecastReading,
}

impl ForecastSnapshot {
    pub fn resolved_location_name(&self) -> &str {
        &self.location.canonical_name
    }
}

/// Pipeline output. Numeric values keep the forecast source's units, see `units`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSummary {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_gust: f64,
    pub condition_code: i32,
    pub conditions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<NaiveDateTime>,
    pub units: Units,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outlook: Option<Outlook>,
}

/// Summary plus the natural-language recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    #[serde(flatten)]
    pub summary: WeatherSummary,
    pub recommendation: String,
}
