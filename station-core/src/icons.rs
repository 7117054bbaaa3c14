//! Mapping from OpenWeatherMap icon codes to the display's bundled assets.

use serde::Serialize;

/// Icon code used whenever the provider supplies nothing usable.
pub const CLEAR_SKY_DAY_CODE: &str = "01d";

/// Local icon asset shipped with the display firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetId {
    #[default]
    ClearDay,
    ClearNight,
    FewCloudsDay,
    FewCloudsNight,
    ScatteredCloudsDay,
    ScatteredCloudsNight,
    BrokenCloudsDay,
    BrokenCloudsNight,
    ShowerRainDay,
    ShowerRainNight,
    RainDay,
    RainNight,
    ThunderstormDay,
    ThunderstormNight,
    SnowDay,
    SnowNight,
    MistDay,
    MistNight,
}

static ICON_TABLE: [(&str, AssetId); 18] = [
    ("01d", AssetId::ClearDay),
    ("01n", AssetId::ClearNight),
    ("02d", AssetId::FewCloudsDay),
    ("02n", AssetId::FewCloudsNight),
    ("03d", AssetId::ScatteredCloudsDay),
    ("03n", AssetId::ScatteredCloudsNight),
    ("04d", AssetId::BrokenCloudsDay),
    ("04n", AssetId::BrokenCloudsNight),
    ("09d", AssetId::ShowerRainDay),
    ("09n", AssetId::ShowerRainNight),
    ("10d", AssetId::RainDay),
    ("10n", AssetId::RainNight),
    ("11d", AssetId::ThunderstormDay),
    ("11n", AssetId::ThunderstormNight),
    ("13d", AssetId::SnowDay),
    ("13n", AssetId::SnowNight),
    ("50d", AssetId::MistDay),
    ("50n", AssetId::MistNight),
];

/// Resolve a provider icon code. Case-sensitive; unknown codes fall back to
/// [`AssetId::ClearDay`].
pub fn resolve(code: &str) -> AssetId {
    ICON_TABLE
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, asset)| *asset)
        .unwrap_or(AssetId::ClearDay)
}

impl AssetId {
    /// Asset file stem.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClearDay => "clear_day",
            Self::ClearNight => "clear_night",
            Self::FewCloudsDay => "few_clouds_day",
            Self::FewCloudsNight => "few_clouds_night",
            Self::ScatteredCloudsDay => "scattered_clouds_day",
            Self::ScatteredCloudsNight => "scattered_clouds_night",
            Self::BrokenCloudsDay => "broken_clouds_day",
            Self::BrokenCloudsNight => "broken_clouds_night",
            Self::ShowerRainDay => "shower_rain_day",
            Self::ShowerRainNight => "shower_rain_night",
            Self::RainDay => "rain_day",
            Self::RainNight => "rain_night",
            Self::ThunderstormDay => "thunderstorm_day",
            Self::ThunderstormNight => "thunderstorm_night",
            Self::SnowDay => "snow_day",
            Self::SnowNight => "snow_night",
            Self::MistDay => "mist_day",
            Self::MistNight => "mist_night",
        }
    }

    /// Short text label for displays without bitmap support.
    pub fn label(self) -> &'static str {
        match self {
            Self::ClearDay => "SUN",
            Self::ClearNight => "MOON",
            Self::FewCloudsDay
            | Self::FewCloudsNight
            | Self::ScatteredCloudsDay
            | Self::ScatteredCloudsNight
            | Self::BrokenCloudsDay
            | Self::BrokenCloudsNight => "CLOUD",
            Self::ShowerRainDay | Self::ShowerRainNight | Self::RainDay | Self::RainNight => "RAIN",
            Self::ThunderstormDay | Self::ThunderstormNight => "STORM",
            Self::SnowDay | Self::SnowNight => "SNOW",
            Self::MistDay | Self::MistNight => "FOG",
        }
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
