use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password, PasswordDisplayMode, Select, Text};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use tokio::sync::watch;

use station_core::{
    Config, HttpTransport, Renderer, UpdateScheduler, WeatherClient,
    client::DEFAULT_REQUEST_TIMEOUT,
    config::{self, ConfigKey, ConfigSource, Resolved},
    touch::{self, AxisCalibration, TouchCalibration},
};

use crate::render::ConsoleRenderer;

const UNIT_SYSTEMS: [&str; 3] = ["metric", "imperial", "standard"];

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-station", version, about = "Weather display station")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll the weather service and print every update.
    Run {
        /// Override file; defaults to conf.txt in the platform config directory.
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Run a single update cycle and exit.
        #[arg(long)]
        once: bool,
    },

    /// Print the resolved configuration with credentials masked.
    ShowConfig {
        #[arg(long, short)]
        config: Option<PathBuf>,
    },

    /// Interactively write the override file.
    Configure {
        #[arg(long, short)]
        config: Option<PathBuf>,
    },

    /// Map a raw touch sample to screen coordinates.
    Touch {
        raw_x: u16,
        raw_y: u16,

        #[arg(long, default_value_t = 200)]
        x_min: u16,
        #[arg(long, default_value_t = 3700)]
        x_max: u16,
        #[arg(long, default_value_t = 240)]
        width: u16,
        #[arg(long, default_value_t = 240)]
        y_min: u16,
        #[arg(long, default_value_t = 3800)]
        y_max: u16,
        #[arg(long, default_value_t = 320)]
        height: u16,

        /// Controller X feeds screen Y.
        #[arg(long)]
        swap: bool,
        #[arg(long)]
        invert_x: bool,
        #[arg(long)]
        invert_y: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Run { config, once } => {
                let resolved = load_config(config)?;
                run_station(resolved.config, once).await?;
            }
            Command::ShowConfig { config } => {
                let resolved = load_config(config)?;
                match &resolved.source {
                    ConfigSource::File(path) => println!("# source: {}", path.display()),
                    ConfigSource::Defaults => println!("# source: compiled defaults"),
                }
                for issue in &resolved.issues {
                    println!("# {issue}");
                }
                print!("{}", resolved.config.to_toml_redacted()?);
            }
            Command::Configure { config } => {
                let path = override_path(config)?;
                configure(&path)?;
            }
            Command::Touch {
                raw_x,
                raw_y,
                x_min,
                x_max,
                width,
                y_min,
                y_max,
                height,
                swap,
                invert_x,
                invert_y,
            } => {
                let calibration = TouchCalibration {
                    x: AxisCalibration { invert: invert_x, ..AxisCalibration::new(x_min, x_max, width) },
                    y: AxisCalibration { invert: invert_y, ..AxisCalibration::new(y_min, y_max, height) },
                    swap_xy: swap,
                };
                let (x, y) = touch::map(raw_x, raw_y, &calibration);
                println!("raw ({raw_x}, {raw_y}) -> screen ({x}, {y})");
            }
        }

        Ok(())
    }
}

fn override_path(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => Config::default_override_path(),
    }
}

fn load_config(explicit: Option<PathBuf>) -> anyhow::Result<Resolved> {
    let path = override_path(explicit)?;
    let resolved = config::resolve(&Config::default(), Some(&path));
    debug!("Configuration resolved with {} issue(s)", resolved.issues.len());
    Ok(resolved)
}

async fn run_station(config: Config, once: bool) -> anyhow::Result<()> {
    let transport = HttpTransport::new(DEFAULT_REQUEST_TIMEOUT)?;
    let mut renderer = ConsoleRenderer::new(&config.weather_units);
    let mut scheduler = UpdateScheduler::new(WeatherClient::new(transport), config);

    if once {
        let outcome = scheduler.run_cycle().await;
        debug!("Cycle finished: {outcome:?}");
        renderer.render(scheduler.weather());
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, shutting down...");
                let _ = shutdown_tx.send(());
            }
            Err(err) => warn!("Ctrl+C handler unavailable ({err}), running until killed"),
        }
    });

    scheduler.run(&mut renderer, shutdown_rx).await;
    Ok(())
}

fn configure(path: &Path) -> anyhow::Result<()> {
    let current = config::resolve(&Config::default(), Some(path)).config;
    println!("Writing {}", path.display());

    let wifi_ssid = Text::new("WiFi SSID:").with_default(&current.wifi_ssid).prompt()?;
    let wifi_password = Password::new("WiFi password:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message("leave empty to keep the current one")
        .prompt()?;
    let weather_api_key = Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message("leave empty to keep the current one")
        .prompt()?;
    let weather_city = Text::new("City:").with_default(&current.weather_city).prompt()?;
    let weather_country_code = Text::new("Country code:")
        .with_default(&current.weather_country_code)
        .prompt()?;
    let cursor = UNIT_SYSTEMS
        .iter()
        .position(|u| *u == current.weather_units)
        .unwrap_or(0);
    let weather_units = Select::new("Units:", UNIT_SYSTEMS.to_vec())
        .with_starting_cursor(cursor)
        .prompt()?;
    let update_interval = CustomType::<u64>::new("Update interval (ms):")
        .with_default(current.update_interval)
        .with_error_message("Please enter a whole number of milliseconds")
        .prompt()?;

    let mut updated = current;
    let fields = [
        (ConfigKey::WifiSsid, wifi_ssid),
        (ConfigKey::WifiPassword, wifi_password),
        (ConfigKey::WeatherApiKey, weather_api_key),
        (ConfigKey::WeatherCity, weather_city),
        (ConfigKey::WeatherCountryCode, weather_country_code),
        (ConfigKey::WeatherUnits, weather_units.to_string()),
        (ConfigKey::UpdateInterval, update_interval.to_string()),
    ];
    for (key, value) in fields {
        if key.is_secret() && value.is_empty() {
            continue;
        }
        updated.set(key, &value);
    }

    updated
        .save_overrides(path)
        .with_context(|| format!("Failed to save configuration to {}", path.display()))?;
    println!("Saved. Update interval in effect: {} s", updated.effective_update_interval().as_secs());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_command_parses_calibration_flags() {
        let cli = Cli::parse_from(["weather-station", "touch", "100", "200", "--swap", "--invert-y"]);

        match cli.command {
            Command::Touch { raw_x, raw_y, swap, invert_x, invert_y, width, .. } => {
                assert_eq!((raw_x, raw_y), (100, 200));
                assert!(swap);
                assert!(!invert_x);
                assert!(invert_y);
                assert_eq!(width, 240);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn run_accepts_config_path_and_once() {
        let cli = Cli::parse_from(["weather-station", "run", "-c", "/tmp/conf.txt", "--once"]);

        match cli.command {
            Command::Run { config, once } => {
                assert_eq!(config, Some(PathBuf::from("/tmp/conf.txt")));
                assert!(once);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn explicit_override_path_wins() {
        let path = override_path(Some(PathBuf::from("conf.txt"))).unwrap();
        assert_eq!(path, PathBuf::from("conf.txt"));
    }
}
