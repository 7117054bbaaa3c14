use log::{info, warn};
use reqwest::Url;

use crate::{
    config::Config,
    error::FetchError,
    model::{CurrentConditions, ForecastSample},
};

mod openweather;
pub mod transport;

pub use transport::{DEFAULT_REQUEST_TIMEOUT, HttpResponse, HttpTransport, Transport};

const API_BASE: &str = "http://api.openweathermap.org/data/2.5";

/// The two OpenWeatherMap resources the station reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Current,
    Forecast,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Current => "current conditions",
            Endpoint::Forecast => "forecast",
        }
    }

    fn path(&self) -> &'static str {
        match self {
            Endpoint::Current => "weather",
            Endpoint::Forecast => "forecast",
        }
    }

    /// Request URL for this endpoint with location, units and key from `config`.
    pub fn url(&self, config: &Config) -> Result<Url, FetchError> {
        let location = if config.weather_country_code.is_empty() {
            config.weather_city.clone()
        } else {
            format!("{},{}", config.weather_city, config.weather_country_code)
        };

        Url::parse_with_params(
            &format!("{API_BASE}/{}", self.path()),
            &[
                ("q", location.as_str()),
                ("units", config.weather_units.as_str()),
                ("appid", config.weather_api_key.as_str()),
            ],
        )
        .map_err(|e| FetchError::Transport(format!("invalid request URL: {e}")))
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fetches and decodes weather data. Holds no state beyond its transport.
#[derive(Debug, Clone)]
pub struct WeatherClient<T> {
    transport: T,
}

impl<T: Transport> WeatherClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn fetch_current(&self, config: &Config) -> Result<CurrentConditions, FetchError> {
        let result = self
            .get_body(Endpoint::Current, config)
            .await
            .and_then(|body| openweather::parse_current(&body));

        match &result {
            Ok(current) => info!(
                "Current conditions for {}: {:.1}°, humidity {}%, {}",
                current.location_name, current.temperature, current.humidity, current.description
            ),
            Err(err) => warn!("Current conditions fetch failed: {err}"),
        }
        result
    }

    pub async fn fetch_forecast(&self, config: &Config) -> Result<Vec<ForecastSample>, FetchError> {
        let result = self
            .get_body(Endpoint::Forecast, config)
            .await
            .and_then(|body| openweather::parse_forecast(&body));

        match &result {
            Ok(samples) => info!("Forecast received: {} samples", samples.len()),
            Err(err) => warn!("Forecast fetch failed: {err}"),
        }
        result
    }

    async fn get_body(&self, endpoint: Endpoint, config: &Config) -> Result<String, FetchError> {
        if !self.transport.link_up() {
            return Err(FetchError::NoConnectivity);
        }

        let url = endpoint.url(config)?;
        info!("Fetching {endpoint} from {}", redacted(&url));

        let res = self
            .transport
            .get(&url)
            .await
            .map_err(|e| {
                FetchError::Transport(scrub_key(&format!("{e:#}"), &config.weather_api_key))
            })?;

        if !res.is_success() {
            return Err(FetchError::HttpStatus(res.status));
        }

        Ok(res.body)
    }
}

/// URL with the API key masked, for logging.
fn redacted(url: &Url) -> String {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "appid" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();

    let mut shown = url.clone();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}

/// Transport error text with any occurrence of the API key masked.
fn scrub_key(message: &str, api_key: &str) -> String {
    if api_key.is_empty() {
        return message.to_string();
    }
    message.replace(api_key, "***")
}
