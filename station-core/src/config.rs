use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use log::{debug, info, warn};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::error::{ConfigIssue, ConfigParseIssue};

/// Longest value, in bytes, kept for any string field.
pub const MAX_FIELD_LEN: usize = 63;

pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 600_000;

/// Shortest poll interval the scheduler will run with.
pub const MIN_UPDATE_INTERVAL_MS: u64 = 10_000;

pub const OVERRIDE_FILE_NAME: &str = "conf.txt";

const DEFAULT_WIFI_SSID: &str = match option_env!("STATION_WIFI_SSID") {
    Some(v) => v,
    None => "YOUR_WIFI_SSID",
};
const DEFAULT_WIFI_PASSWORD: &str = match option_env!("STATION_WIFI_PASSWORD") {
    Some(v) => v,
    None => "YOUR_WIFI_PASSWORD",
};
const DEFAULT_API_KEY: &str = match option_env!("STATION_API_KEY") {
    Some(v) => v,
    None => "YOUR_API_KEY_HERE",
};
const DEFAULT_CITY: &str = "London";
const DEFAULT_COUNTRY_CODE: &str = "GB";
const DEFAULT_UNITS: &str = "metric";

const REDACTED: &str = "********";

/// Keys accepted in the override file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    WifiSsid,
    WifiPassword,
    WeatherApiKey,
    WeatherCity,
    WeatherCountryCode,
    WeatherUnits,
    UpdateInterval,
}

impl ConfigKey {
    pub const fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::WifiSsid,
            ConfigKey::WifiPassword,
            ConfigKey::WeatherApiKey,
            ConfigKey::WeatherCity,
            ConfigKey::WeatherCountryCode,
            ConfigKey::WeatherUnits,
            ConfigKey::UpdateInterval,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::WifiSsid => "wifi_ssid",
            ConfigKey::WifiPassword => "wifi_password",
            ConfigKey::WeatherApiKey => "weather_api_key",
            ConfigKey::WeatherCity => "weather_city",
            ConfigKey::WeatherCountryCode => "weather_country_code",
            ConfigKey::WeatherUnits => "weather_units",
            ConfigKey::UpdateInterval => "update_interval",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn parse(key: &str) -> Option<ConfigKey> {
        Self::all().iter().copied().find(|k| k.as_str() == key)
    }

    /// Credential-bearing keys never have their values logged.
    pub fn is_secret(&self) -> bool {
        matches!(self, ConfigKey::WifiPassword | ConfigKey::WeatherApiKey)
    }
}

/// Operating configuration of the station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub wifi_ssid: String,
    pub wifi_password: String,
    pub weather_api_key: String,
    pub weather_city: String,
    pub weather_country_code: String,
    /// Provider unit system: "metric", "imperial" or "standard".
    pub weather_units: String,
    /// Poll interval in milliseconds. Zero means "not set".
    pub update_interval: u64,
}

impl Default for Config {
    /// Compiled-in defaults, held to the same field length as overrides.
    fn default() -> Self {
        Self {
            wifi_ssid: truncate_field(DEFAULT_WIFI_SSID),
            wifi_password: truncate_field(DEFAULT_WIFI_PASSWORD),
            weather_api_key: truncate_field(DEFAULT_API_KEY),
            weather_city: truncate_field(DEFAULT_CITY),
            weather_country_code: truncate_field(DEFAULT_COUNTRY_CODE),
            weather_units: truncate_field(DEFAULT_UNITS),
            update_interval: DEFAULT_UPDATE_INTERVAL_MS,
        }
    }
}

/// Where the resolved configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Defaults,
    File(PathBuf),
}

/// Result of [`resolve`]: the configuration plus every non-fatal notice.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub config: Config,
    pub source: ConfigSource,
    pub issues: Vec<ConfigIssue>,
}

/// Overlay the optional override file at `source` on top of `defaults`.
///
/// Never fails: a missing or unreadable source yields the defaults together
/// with a [`ConfigIssue::SourceUnavailable`] notice.
pub fn resolve(defaults: &Config, source: Option<&Path>) -> Resolved {
    let Some(path) = source else {
        warn!("No override source configured, using compiled defaults");
        return Resolved {
            config: defaults.clone(),
            source: ConfigSource::Defaults,
            issues: vec![ConfigIssue::SourceUnavailable {
                path: None,
                reason: "no override source configured".to_string(),
            }],
        };
    };

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            warn!("{} not readable ({err}), using compiled defaults", path.display());
            return Resolved {
                config: defaults.clone(),
                source: ConfigSource::Defaults,
                issues: vec![ConfigIssue::SourceUnavailable {
                    path: Some(path.to_path_buf()),
                    reason: err.to_string(),
                }],
            };
        }
    };

    info!("Reading configuration overrides from {}", path.display());
    let (config, parse_issues) = apply_overrides(defaults, &text);
    config.log_summary();

    Resolved {
        config,
        source: ConfigSource::File(path.to_path_buf()),
        issues: parse_issues.into_iter().map(ConfigIssue::from).collect(),
    }
}

/// Apply `key=value` override text to a copy of `defaults`.
pub fn apply_overrides(defaults: &Config, text: &str) -> (Config, Vec<ConfigParseIssue>) {
    let mut config = defaults.clone();
    let mut issues = Vec::new();
    let mut applied = 0usize;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();

        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            warn!("Config line {line_no}: no '=' found, skipped");
            issues.push(ConfigParseIssue::MissingSeparator { line: line_no });
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            warn!("Config line {line_no}: empty key, skipped");
            issues.push(ConfigParseIssue::MissingSeparator { line: line_no });
            continue;
        }
        let value = strip_quotes(value.trim());

        let Some(known) = ConfigKey::parse(key) else {
            warn!("Config line {line_no}: unknown key '{key}'");
            issues.push(ConfigParseIssue::UnknownKey { line: line_no, key: key.to_string() });
            continue;
        };

        config.set(known, value);
        applied += 1;

        info!("{}", override_log_line(known, value));
    }

    debug!("Applied {applied} override(s), {} issue(s)", issues.len());
    (config, issues)
}

impl Config {
    /// Overwrite the field behind `key` with a raw override value.
    pub fn set(&mut self, key: ConfigKey, value: &str) {
        match key {
            ConfigKey::WifiSsid => self.wifi_ssid = truncate_field(value),
            ConfigKey::WifiPassword => self.wifi_password = truncate_field(value),
            ConfigKey::WeatherApiKey => self.weather_api_key = truncate_field(value),
            ConfigKey::WeatherCity => self.weather_city = truncate_field(value),
            ConfigKey::WeatherCountryCode => self.weather_country_code = truncate_field(value),
            ConfigKey::WeatherUnits => self.weather_units = truncate_field(value),
            ConfigKey::UpdateInterval => {
                self.update_interval = value.parse().unwrap_or(0);
                if self.update_interval == 0 {
                    warn!("update_interval {value:?} is not a positive integer; default will apply");
                }
            }
        }
    }

    /// Field value as it would be written back to an override file.
    pub fn get(&self, key: ConfigKey) -> String {
        match key {
            ConfigKey::WifiSsid => self.wifi_ssid.clone(),
            ConfigKey::WifiPassword => self.wifi_password.clone(),
            ConfigKey::WeatherApiKey => self.weather_api_key.clone(),
            ConfigKey::WeatherCity => self.weather_city.clone(),
            ConfigKey::WeatherCountryCode => self.weather_country_code.clone(),
            ConfigKey::WeatherUnits => self.weather_units.clone(),
            ConfigKey::UpdateInterval => self.update_interval.to_string(),
        }
    }

    /// Interval the scheduler should actually use.
    ///
    /// Zero (unset or unparsable) falls back to the compiled default; anything
    /// below [`MIN_UPDATE_INTERVAL_MS`] is raised to it.
    pub fn effective_update_interval(&self) -> Duration {
        let ms = match self.update_interval {
            0 => DEFAULT_UPDATE_INTERVAL_MS,
            ms => ms.max(MIN_UPDATE_INTERVAL_MS),
        };
        Duration::from_millis(ms)
    }

    /// Copy with credential fields masked, safe to print.
    pub fn redacted(&self) -> Config {
        let mask = |s: &str| if s.is_empty() { String::new() } else { REDACTED.to_string() };
        Config {
            wifi_password: mask(&self.wifi_password),
            weather_api_key: mask(&self.weather_api_key),
            ..self.clone()
        }
    }

    /// Redacted configuration as TOML, for display.
    pub fn to_toml_redacted(&self) -> Result<String> {
        toml::to_string_pretty(&self.redacted()).context("Failed to serialize configuration to TOML")
    }

    /// Log the non-credential fields.
    pub fn log_summary(&self) {
        info!("Final configuration:");
        info!("  WiFi SSID: {}", self.wifi_ssid);
        info!("  Weather city: {}", self.weather_city);
        info!("  Country code: {}", self.weather_country_code);
        info!("  Units: {}", self.weather_units);
        info!(
            "  Update interval: {} ms (effective {} ms)",
            self.update_interval,
            self.effective_update_interval().as_millis()
        );
    }

    /// Render as override file text; reading it back yields the same config.
    pub fn to_override_text(&self) -> String {
        let mut out = String::from("# Weather station configuration\n");
        for key in ConfigKey::all() {
            match key {
                ConfigKey::UpdateInterval => {
                    out.push_str(&format!("{}={}\n", key.as_str(), self.get(*key)));
                }
                _ => out.push_str(&format!("{}=\"{}\"\n", key.as_str(), self.get(*key))),
            }
        }
        out
    }

    /// Write the override file, creating parent directories as needed.
    pub fn save_overrides(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, self.to_override_text())
            .with_context(|| format!("Failed to write override file: {}", path.display()))?;

        Ok(())
    }

    /// Platform location of the override file.
    pub fn default_override_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-station", "weather-station")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join(OVERRIDE_FILE_NAME))
    }
}

/// Log line for an applied override. Credentials show only their length.
fn override_log_line(key: ConfigKey, value: &str) -> String {
    if key.is_secret() {
        format!("  {} = <{} chars>", key.as_str(), value.len())
    } else {
        format!("  {} = {:?}", key.as_str(), value)
    }
}

fn strip_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn truncate_field(value: &str) -> String {
    if value.len() <= MAX_FIELD_LEN {
        return value.to_string();
    }
    let mut end = MAX_FIELD_LEN;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_source_returns_defaults() {
        let defaults = Config::default();
        let resolved = resolve(&defaults, None);

        assert_eq!(resolved.config, defaults);
        assert_eq!(resolved.source, ConfigSource::Defaults);
        assert!(matches!(
            resolved.issues.as_slice(),
            [ConfigIssue::SourceUnavailable { path: None, .. }]
        ));
    }

    #[test]
    fn unreadable_source_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");
        let defaults = Config::default();

        let resolved = resolve(&defaults, Some(&path));

        assert_eq!(resolved.config, defaults);
        assert_eq!(resolved.source, ConfigSource::Defaults);
        assert_eq!(resolved.issues.len(), 1);
    }

    #[test]
    fn subset_of_keys_only_changes_those_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# location").unwrap();
        writeln!(file, "weather_city = \"Oslo\"").unwrap();
        writeln!(file, "weather_country_code=NO").unwrap();
        let defaults = Config::default();

        let resolved = resolve(&defaults, Some(file.path()));

        assert_eq!(resolved.source, ConfigSource::File(file.path().to_path_buf()));
        assert!(resolved.issues.is_empty());
        assert_eq!(
            resolved.config,
            Config {
                weather_city: "Oslo".into(),
                weather_country_code: "NO".into(),
                ..defaults
            }
        );
    }

    #[test]
    fn comments_blank_lines_and_bad_lines_are_skipped() {
        let text = "\n   \n# comment\n// also comment\nthis line has no separator\n=orphan\nweather_units=imperial\n";
        let (config, issues) = apply_overrides(&Config::default(), text);

        assert_eq!(config.weather_units, "imperial");
        assert_eq!(
            issues,
            vec![
                ConfigParseIssue::MissingSeparator { line: 5 },
                ConfigParseIssue::MissingSeparator { line: 6 },
            ]
        );
    }

    #[test]
    fn unknown_key_is_reported_and_ignored() {
        let defaults = Config::default();
        let (config, issues) = apply_overrides(&defaults, "unknown_key=foo");

        assert_eq!(config, defaults);
        assert_eq!(
            issues,
            vec![ConfigParseIssue::UnknownKey { line: 1, key: "unknown_key".into() }]
        );
    }

    #[test]
    fn keys_match_exactly() {
        let defaults = Config::default();
        let (config, issues) = apply_overrides(&defaults, "Weather_City=Paris");

        assert_eq!(config, defaults);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn value_splits_at_first_equals_and_strips_one_quote_pair() {
        let (config, _) = apply_overrides(
            &Config::default(),
            "wifi_password=\"\"a=b\"\"\nwifi_ssid=\"open",
        );

        assert_eq!(config.wifi_password, "\"a=b\"");
        assert_eq!(config.wifi_ssid, "\"open");
    }

    #[test]
    fn non_numeric_interval_yields_zero_and_default_applies() {
        let (config, issues) = apply_overrides(&Config::default(), "update_interval=abc");

        assert!(issues.is_empty());
        assert_eq!(config.update_interval, 0);
        assert_eq!(
            config.effective_update_interval(),
            Duration::from_millis(DEFAULT_UPDATE_INTERVAL_MS)
        );
    }

    #[test]
    fn interval_with_trailing_garbage_is_rejected() {
        let (config, _) = apply_overrides(&Config::default(), "update_interval=123abc");

        assert_eq!(config.update_interval, 0);
        assert_eq!(
            config.effective_update_interval(),
            Duration::from_millis(DEFAULT_UPDATE_INTERVAL_MS)
        );
    }

    #[test]
    fn short_interval_is_raised_to_minimum() {
        let (config, _) = apply_overrides(&Config::default(), "update_interval=500");

        assert_eq!(config.update_interval, 500);
        assert_eq!(
            config.effective_update_interval(),
            Duration::from_millis(MIN_UPDATE_INTERVAL_MS)
        );

        let (config, _) = apply_overrides(&Config::default(), "update_interval=300000");
        assert_eq!(config.effective_update_interval(), Duration::from_secs(300));
    }

    #[test]
    fn long_values_are_truncated_to_field_length() {
        let long = "x".repeat(100);
        let (config, _) = apply_overrides(&Config::default(), &format!("wifi_ssid={long}"));

        assert_eq!(config.wifi_ssid.len(), MAX_FIELD_LEN);
        assert_eq!(config.wifi_ssid, "x".repeat(MAX_FIELD_LEN));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // 62 ASCII bytes followed by a 2-byte character straddling the limit.
        let value = format!("{}é", "a".repeat(62));
        let truncated = truncate_field(&value);

        assert_eq!(truncated, "a".repeat(62));
    }

    #[test]
    fn override_log_line_hides_credential_values() {
        let password = override_log_line(ConfigKey::WifiPassword, "hunter2");
        let key = override_log_line(ConfigKey::WeatherApiKey, "abc123def");

        assert_eq!(password, "  wifi_password = <7 chars>");
        assert_eq!(key, "  weather_api_key = <9 chars>");
        assert_eq!(
            override_log_line(ConfigKey::WeatherCity, "Oslo"),
            "  weather_city = \"Oslo\""
        );
    }

    #[test]
    fn defaults_respect_field_length() {
        let cfg = Config::default();

        for key in ConfigKey::all() {
            assert!(cfg.get(*key).len() <= MAX_FIELD_LEN, "{}", key.as_str());
        }
    }

    #[test]
    fn redacted_masks_credentials_only() {
        let cfg = Config::default().redacted();

        assert_eq!(cfg.wifi_password, REDACTED);
        assert_eq!(cfg.weather_api_key, REDACTED);
        assert_eq!(cfg.weather_city, Config::default().weather_city);
    }

    #[test]
    fn toml_output_never_contains_credentials() {
        let cfg = Config {
            wifi_password: "hunter2".into(),
            weather_api_key: "abc123".into(),
            ..Config::default()
        };

        let text = cfg.to_toml_redacted().unwrap();

        assert!(!text.contains("hunter2"));
        assert!(!text.contains("abc123"));
        assert!(text.contains("weather_city = \"London\""));
        assert!(text.contains("update_interval = 600000"));
    }

    #[test]
    fn override_text_reads_back_to_same_config() {
        let cfg = Config {
            weather_city: "New York".into(),
            weather_country_code: "US".into(),
            weather_units: "imperial".into(),
            update_interval: 120_000,
            ..Config::default()
        };

        let (parsed, issues) = apply_overrides(&Config::default(), &cfg.to_override_text());

        assert!(issues.is_empty());
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn save_overrides_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(OVERRIDE_FILE_NAME);

        Config::default().save_overrides(&path).unwrap();

        let resolved = resolve(&Config::default(), Some(&path));
        assert_eq!(resolved.config, Config::default());
        assert!(resolved.issues.is_empty());
    }
}
