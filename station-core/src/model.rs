use serde::Serialize;

use crate::icons::AssetId;

/// Latest observed conditions, replaced wholesale on each successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub feels_like: f64,
    /// Relative humidity, 0–100.
    pub humidity: u8,
    pub description: String,
    pub icon_code: String,
    pub icon: AssetId,
    pub location_name: String,
    /// Local observation time as `HH:MM`.
    pub observed_at: String,
}

/// One entry of the provider's 3-hourly forecast feed.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSample {
    /// Epoch seconds, UTC.
    pub timestamp: i64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub icon_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    /// Short weekday label, `Sun`..`Sat`.
    pub weekday: String,
    pub temp_min: f64,
    pub temp_max: f64,
    pub icon_code: String,
    pub icon: AssetId,
}

/// One of the three forecast slots shown on the display.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum DailyForecast {
    #[default]
    Empty,
    Valid(DaySummary),
}

impl DailyForecast {
    pub fn is_valid(&self) -> bool {
        matches!(self, DailyForecast::Valid(_))
    }

    pub fn summary(&self) -> Option<&DaySummary> {
        match self {
            DailyForecast::Valid(day) => Some(day),
            DailyForecast::Empty => None,
        }
    }
}

/// Outcome of the most recent fetch, as shown in the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    /// Nothing attempted yet.
    #[default]
    Pending,
    Ok,
    NoConnectivity,
    HttpError,
    DecodeError,
}

impl FetchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FetchStatus::Pending => "pending",
            FetchStatus::Ok => "ok",
            FetchStatus::NoConnectivity => "no-connectivity",
            FetchStatus::HttpError => "http-error",
            FetchStatus::DecodeError => "decode-error",
        }
    }

    /// Text for the on-screen status label.
    pub fn caption(self) -> &'static str {
        match self {
            FetchStatus::Pending => "Updating...",
            FetchStatus::Ok => "Status: OK",
            FetchStatus::NoConnectivity => "No WiFi",
            FetchStatus::HttpError => "API Error",
            FetchStatus::DecodeError => "Parse Error",
        }
    }
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
