//! HTTP and chat boundary for the weather pipeline.
//!
//! - [`http`]: status-code mapping and JSON envelopes
//! - [`chat`]: webhook handling and chat reply texts
//! - [`messenger`]: reply delivery to the messaging platform
//! - [`routes`]: the axum router tying them to a [`weather_core::WeatherService`]

pub mod chat;
pub mod http;
pub mod messenger;
pub mod routes;

pub use messenger::{ChatMessenger, messenger_from_config};
pub use routes::{AppState, router};
