//! Core library of the weather display station.
//!
//! This crate defines:
//! - Layered configuration (compiled defaults + `key=value` override file)
//! - The OpenWeatherMap client and its transport abstraction
//! - Forecast reduction to three display days and the icon catalog
//! - The update scheduler that owns the published weather snapshot
//! - Touch panel coordinate mapping
//!
//! Rendering, the display driver and Wi-Fi association live outside; the
//! `station-cli` binary stands in for them on a host machine.

pub mod client;
pub mod config;
pub mod error;
pub mod forecast;
pub mod icons;
pub mod model;
pub mod scheduler;
pub mod touch;

pub use client::{HttpTransport, Transport, WeatherClient};
pub use config::{Config, ConfigKey, ConfigSource, Resolved};
pub use error::{ConfigIssue, ConfigParseIssue, FetchError};
pub use icons::AssetId;
pub use model::{CurrentConditions, DailyForecast, DaySummary, FetchStatus, ForecastSample};
pub use scheduler::{CycleOutcome, Renderer, SchedulerState, UpdateScheduler, WeatherState};
pub use touch::{AxisCalibration, TouchCalibration};
