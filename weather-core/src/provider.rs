//! Ports for the external lookups the pipeline depends on.
//!
//! Implementations speak `anyhow`; the pipeline converts their failures into
//! typed errors at the call site (see [`crate::outcome::from_future`]).

use async_trait::async_trait;

use crate::model::{ForecastReading, GeoLocation};

pub mod open_meteo;

pub use open_meteo::OpenMeteoClient;

/// Name → coordinates lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Candidates in the collaborator's own ranking order; may be empty.
    async fn search(&self, name: &str) -> anyhow::Result<Vec<GeoLocation>>;
}

/// Coordinates → current conditions lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn current(&self, latitude: f64, longitude: f64) -> anyhow::Result<ForecastReading>;
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
