//! OpenWeatherMap wire format.
//!
//! Only the containers (`main`, `weather`, `list`) are required; every leaf
//! falls back to a zero value when absent.

use chrono::DateTime;
use log::debug;
use serde::Deserialize;

use crate::{
    error::FetchError,
    icons,
    model::{CurrentConditions, ForecastSample},
};

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: Option<f64>,
    feels_like: Option<f64>,
    humidity: Option<f64>,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
    name: Option<String>,
    dt: Option<i64>,
    timezone: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: Option<i64>,
    main: Option<OwMain>,
    weather: Option<Vec<OwWeather>>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

pub(crate) fn parse_current(body: &str) -> Result<CurrentConditions, FetchError> {
    let parsed: OwCurrentResponse =
        serde_json::from_str(body).map_err(|e| FetchError::DecodeFailed(e.to_string()))?;

    let (description, icon_code) = parsed
        .weather
        .into_iter()
        .next()
        .map(|w| (w.description.unwrap_or_default(), w.icon.unwrap_or_default()))
        .unwrap_or_default();

    let observed_at = local_time_hhmm(
        parsed.dt.unwrap_or_default(),
        parsed.timezone.unwrap_or_default(),
    );

    Ok(CurrentConditions {
        temperature: parsed.main.temp.unwrap_or_default(),
        feels_like: parsed.main.feels_like.unwrap_or_default(),
        humidity: parsed.main.humidity.unwrap_or_default().clamp(0.0, 100.0).round() as u8,
        description,
        icon: icons::resolve(&icon_code),
        icon_code,
        location_name: parsed.name.unwrap_or_default(),
        observed_at,
    })
}

/// Decode the forecast list. Entries without a timestamp carry no day and are
/// dropped.
pub(crate) fn parse_forecast(body: &str) -> Result<Vec<ForecastSample>, FetchError> {
    let parsed: OwForecastResponse =
        serde_json::from_str(body).map_err(|e| FetchError::DecodeFailed(e.to_string()))?;

    let total = parsed.list.len();
    let samples: Vec<ForecastSample> = parsed
        .list
        .into_iter()
        .filter_map(|entry| {
            let timestamp = entry.dt?;
            let (temp_min, temp_max) = entry
                .main
                .map(|m| (m.temp_min.unwrap_or_default(), m.temp_max.unwrap_or_default()))
                .unwrap_or_default();
            let icon_code = entry
                .weather
                .and_then(|w| w.into_iter().next())
                .and_then(|w| w.icon)
                .unwrap_or_default();

            Some(ForecastSample { timestamp, temp_min, temp_max, icon_code })
        })
        .collect();

    if samples.len() < total {
        debug!("Dropped {} forecast entries without timestamp", total - samples.len());
    }

    Ok(samples)
}

fn local_time_hhmm(dt: i64, utc_offset: i64) -> String {
    DateTime::from_timestamp(dt.saturating_add(utc_offset), 0)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}
