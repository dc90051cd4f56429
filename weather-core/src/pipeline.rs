//! validate → geocode → forecast → format, stopping at the first failure.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    Config,
    conditions::ConditionTable,
    error::WeatherError,
    model::{ForecastSnapshot, GeoLocation, PlaceName, WeatherReport, WeatherSummary},
    outcome::{AsyncResultExt, Outcome, from_future},
    provider::{ForecastSource, Geocoder, OpenMeteoClient},
    summarizer::{Summarizer, summarizer_from_config},
};

pub const MAX_PLACE_NAME_CHARS: usize = 100;

/// Check the raw `city` input before any collaborator is contacted.
pub fn validate_city(raw: Option<&str>) -> Outcome<PlaceName> {
    let name = raw.map(str::trim).unwrap_or_default();

    if name.is_empty() {
        return Err(WeatherError::validation("city is required", "city"));
    }
    if name.chars().count() > MAX_PLACE_NAME_CHARS {
        return Err(WeatherError::validation(
            format!("city must be at most {MAX_PLACE_NAME_CHARS} characters"),
            "city",
        ));
    }

    Ok(PlaceName::new_unchecked(name.to_string()))
}

/// First candidate wins; later ones are ignored.
pub fn first_match(candidates: Vec<GeoLocation>, name: &PlaceName) -> Outcome<GeoLocation> {
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::not_found("location", name.as_str()))
}

pub fn format_summary(snapshot: ForecastSnapshot, conditions: &ConditionTable) -> WeatherSummary {
    let ForecastSnapshot { location, reading } = snapshot;

    WeatherSummary {
        conditions: conditions.describe(reading.condition_code).to_string(),
        location: location.canonical_name,
        latitude: location.latitude,
        longitude: location.longitude,
        temperature: reading.temperature,
        feels_like: reading.feels_like,
        humidity: reading.humidity,
        wind_speed: reading.wind_speed,
        wind_gust: reading.wind_gust,
        condition_code: reading.condition_code,
        observed_at: reading.observed_at,
        units: reading.units,
        outlook: reading.outlook,
    }
}

/// Stateless entry point; share it behind an `Arc` across concurrent requests.
#[derive(Clone)]
pub struct WeatherService {
    geocoder: Arc<dyn Geocoder>,
    forecast: Arc<dyn ForecastSource>,
    summarizer: Arc<dyn Summarizer>,
    conditions: Arc<ConditionTable>,
}

impl WeatherService {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        forecast: Arc<dyn ForecastSource>,
        summarizer: Arc<dyn Summarizer>,
        conditions: ConditionTable,
    ) -> Self {
        Self {
            geocoder,
            forecast,
            summarizer,
            conditions: Arc::new(conditions),
        }
    }

    /// Open-Meteo lookups plus the configured summarizer.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let open_meteo = Arc::new(OpenMeteoClient::new(&config.open_meteo));

        Ok(Self::new(
            open_meteo.clone(),
            open_meteo,
            summarizer_from_config(config)?,
            config.condition_table(),
        ))
    }

    pub async fn lookup(&self, raw_city: Option<&str>) -> Outcome<WeatherSummary> {
        validate_city(raw_city)
            .and_then_async(|city| self.geocode(city))
            .await
            .and_then_async(|location| self.fetch_forecast(location))
            .await
            .map(|snapshot| format_summary(snapshot, &self.conditions))
    }

    /// [`lookup`](Self::lookup) followed by the natural-language summary.
    pub async fn report(&self, raw_city: Option<&str>) -> Outcome<WeatherReport> {
        self.lookup(raw_city)
            .await
            .and_then_async(|summary| self.summarize(summary))
            .await
    }

    /// Blocking variant of [`lookup`](Self::lookup) for synchronous callers.
    ///
    /// Runs on a private current-thread runtime, so it must not be called from
    /// inside an async context.
    pub fn lookup_blocking(&self, raw_city: Option<&str>) -> Outcome<WeatherSummary> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| WeatherError::infrastructure("failed to start async runtime", e))
            .and_then(|rt| rt.block_on(self.lookup(raw_city)))
    }

    #[instrument(skip_all, fields(city = %city))]
    async fn geocode(&self, city: PlaceName) -> Outcome<GeoLocation> {
        from_future(self.geocoder.search(city.as_str()), |e| {
            WeatherError::from_collaborator("geocoding lookup failed", e)
        })
        .await
        .inspect(|candidates| debug!(count = candidates.len(), "geocoding candidates"))
        .and_then(|candidates| first_match(candidates, &city))
    }

    #[instrument(skip_all, fields(location = %location.canonical_name))]
    async fn fetch_forecast(&self, location: GeoLocation) -> Outcome<ForecastSnapshot> {
        from_future(
            self.forecast.current(location.latitude, location.longitude),
            |e| WeatherError::from_collaborator("forecast lookup failed", e),
        )
        .await
        .map(|reading| ForecastSnapshot { location, reading })
        .inspect(|snapshot| {
            debug!(
                location = snapshot.resolved_location_name(),
                code = snapshot.reading.condition_code,
                "forecast received"
            )
        })
    }

    #[instrument(skip_all, fields(location = %summary.location))]
    async fn summarize(&self, summary: WeatherSummary) -> Outcome<WeatherReport> {
        let recommendation = from_future(self.summarizer.summarize(&summary), |e| {
            WeatherError::from_collaborator("summary generation failed", e)
        })
        .await;

        recommendation.map(|recommendation| WeatherReport {
            summary,
            recommendation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{ErrorKind, UpstreamFailure},
        model::{ForecastReading, Units},
        provider::{MockForecastSource, MockGeocoder},
        summarizer::MockSummarizer,
    };

    fn tokyo() -> GeoLocation {
        GeoLocation {
            latitude: 35.68,
            longitude: 139.69,
            canonical_name: "Tokyo".into(),
        }
    }

    fn reading(code: i32) -> ForecastReading {
        ForecastReading {
            temperature: 22.0,
            feels_like: 21.0,
            humidity: 60.0,
            wind_speed: 10.0,
            wind_gust: 20.0,
            condition_code: code,
            observed_at: None,
            units: Units::default(),
            outlook: None,
        }
    }

    fn service(
        geocoder: MockGeocoder,
        forecast: MockForecastSource,
        summarizer: MockSummarizer,
    ) -> WeatherService {
        WeatherService::new(
            Arc::new(geocoder),
            Arc::new(forecast),
            Arc::new(summarizer),
            ConditionTable::default(),
        )
    }

    fn untouched() -> (MockGeocoder, MockForecastSource, MockSummarizer) {
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_search().times(0);
        let mut forecast = MockForecastSource::new();
        forecast.expect_current().times(0);
        let mut summarizer = MockSummarizer::new();
        summarizer.expect_summarize().times(0);
        (geocoder, forecast, summarizer)
    }

    #[test]
    fn validate_trims_input() {
        assert_eq!(validate_city(Some("  Tokyo ")).unwrap().as_str(), "Tokyo");
    }

    #[test]
    fn validate_rejects_overlong_names() {
        let long = "a".repeat(MAX_PLACE_NAME_CHARS + 1);
        let err = validate_city(Some(&long)).unwrap_err();
        assert_eq!(err.field(), Some("city"));
    }

    #[test]
    fn first_match_ignores_later_candidates() {
        let mut other = tokyo();
        other.canonical_name = "Tokyo, Oregon".into();
        let name = validate_city(Some("Tokyo")).unwrap();

        let picked = first_match(vec![tokyo(), other], &name).unwrap();
        assert_eq!(picked.canonical_name, "Tokyo");
    }

    #[tokio::test]
    async fn tokyo_end_to_end() {
        let mut geocoder = MockGeocoder::new();
        geocoder
            .expect_search()
            .times(1)
            .returning(|name| {
                assert_eq!(name, "Tokyo");
                Ok(vec![tokyo()])
            });

        let mut forecast = MockForecastSource::new();
        forecast
            .expect_current()
            .times(1)
            .returning(|lat, lon| {
                assert_eq!((lat, lon), (35.68, 139.69));
                Ok(reading(1))
            });

        let mut summarizer = MockSummarizer::new();
        summarizer.expect_summarize().times(0);

        let summary = service(geocoder, forecast, summarizer)
            .lookup(Some("Tokyo"))
            .await
            .unwrap();

        assert_eq!(summary.location, "Tokyo");
        assert_eq!(summary.conditions, "Mainly clear");
        assert_eq!(summary.temperature, 22.0);
        assert_eq!(summary.humidity, 60.0);
        assert_eq!(summary.condition_code, 1);
    }

    #[tokio::test]
    async fn empty_city_fails_before_any_lookup() {
        let (geocoder, forecast, summarizer) = untouched();
        let svc = service(geocoder, forecast, summarizer);

        for raw in [None, Some(""), Some("   ")] {
            let err = svc.report(raw).await.unwrap_err();
            match err {
                WeatherError::Validation { field, .. } => assert_eq!(field.as_deref(), Some("city")),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn zero_candidates_is_not_found_and_skips_forecast() {
        let (_, forecast, summarizer) = untouched();
        let mut geocoder = MockGeocoder::new();
        geocoder
            .expect_search()
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let err = service(geocoder, forecast, summarizer)
            .report(Some("Atlantis"))
            .await
            .unwrap_err();

        match err {
            WeatherError::NotFound { resource, id } => {
                assert_eq!(resource, "location");
                assert_eq!(id.as_deref(), Some("Atlantis"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn geocoder_transport_failure_is_infrastructure() {
        let (_, forecast, summarizer) = untouched();
        let mut geocoder = MockGeocoder::new();
        geocoder
            .expect_search()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("dns error")));

        let err = service(geocoder, forecast, summarizer)
            .lookup(Some("Tokyo"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Infrastructure);
        assert_eq!(err.message(), "geocoding lookup failed");
    }

    #[tokio::test]
    async fn forecast_rejection_is_upstream_api() {
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_search().returning(|_| Ok(vec![tokyo()]));

        let mut forecast = MockForecastSource::new();
        forecast.expect_current().times(1).returning(|_, _| {
            Err(anyhow::anyhow!(UpstreamFailure {
                status: 400,
                reason: "Invalid coordinates".into(),
            }))
        });

        let mut summarizer = MockSummarizer::new();
        summarizer.expect_summarize().times(0);

        let err = service(geocoder, forecast, summarizer)
            .report(Some("Tokyo"))
            .await
            .unwrap_err();

        match err {
            WeatherError::UpstreamApi {
                status_code,
                message,
            } => {
                assert_eq!(status_code, Some(400));
                assert_eq!(message, "forecast lookup failed: Invalid coordinates");
            }
            other => panic!("expected UpstreamApi, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_weather_code_is_not_an_error() {
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_search().returning(|_| Ok(vec![tokyo()]));
        let mut forecast = MockForecastSource::new();
        forecast.expect_current().returning(|_, _| Ok(reading(999)));
        let summarizer = MockSummarizer::new();

        let summary = service(geocoder, forecast, summarizer)
            .lookup(Some("Tokyo"))
            .await
            .unwrap();
        assert_eq!(summary.conditions, "Unknown");
    }

    #[tokio::test]
    async fn report_attaches_recommendation() {
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_search().returning(|_| Ok(vec![tokyo()]));
        let mut forecast = MockForecastSource::new();
        forecast.expect_current().returning(|_, _| Ok(reading(0)));
        let mut summarizer = MockSummarizer::new();
        summarizer
            .expect_summarize()
            .times(1)
            .returning(|s| Ok(format!("Enjoy the {} in {}.", s.conditions, s.location)));

        let report = service(geocoder, forecast, summarizer)
            .report(Some("Tokyo"))
            .await
            .unwrap();

        assert_eq!(report.summary.conditions, "Clear sky");
        assert_eq!(report.recommendation, "Enjoy the Clear sky in Tokyo.");
    }

    #[tokio::test]
    async fn summarizer_failure_is_terminal() {
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_search().returning(|_| Ok(vec![tokyo()]));
        let mut forecast = MockForecastSource::new();
        forecast.expect_current().returning(|_, _| Ok(reading(0)));
        let mut summarizer = MockSummarizer::new();
        summarizer
            .expect_summarize()
            .returning(|_| Err(anyhow::anyhow!("connection reset")));

        let err = service(geocoder, forecast, summarizer)
            .report(Some("Tokyo"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Infrastructure);
    }

    #[test]
    fn lookup_blocking_runs_pipeline_synchronously() {
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_search().returning(|_| Ok(vec![tokyo()]));
        let mut forecast = MockForecastSource::new();
        forecast.expect_current().returning(|_, _| Ok(reading(3)));

        let summary = service(geocoder, forecast, MockSummarizer::new())
            .lookup_blocking(Some("Tokyo"))
            .unwrap();
        assert_eq!(summary.conditions, "Overcast");
    }

    #[test]
    fn from_config_builds_with_defaults() {
        assert!(WeatherService::from_config(&Config::default()).is_ok());
    }
}
