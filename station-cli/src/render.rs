use chrono::Local;
use station_core::{DailyForecast, Renderer, WeatherState};
use tokio::time::Instant;

/// Prints each published snapshot to stdout, laid out like the display.
#[derive(Debug)]
pub struct ConsoleRenderer {
    unit: &'static str,
}

impl ConsoleRenderer {
    pub fn new(units: &str) -> Self {
        Self { unit: unit_suffix(units) }
    }

    fn lines(&self, weather: &WeatherState, now: Instant) -> Vec<String> {
        let mut out = Vec::new();

        match weather.current() {
            Some(current) => {
                out.push(format!("{} ({})", current.location_name, current.observed_at));
                out.push(format!(
                    "[{}] {:.1}{}  feels {:.1}{}",
                    current.icon.label(),
                    current.temperature,
                    self.unit,
                    current.feels_like,
                    self.unit
                ));
                out.push(capitalize(&current.description));
                out.push(format!("Humidity: {}%", current.humidity));
            }
            None => out.push("No weather data yet".to_string()),
        }

        for slot in weather.forecast() {
            out.push(match slot {
                DailyForecast::Valid(day) => format!(
                    "{}  {:.0}{}/{:.0}{}  {}",
                    day.weekday,
                    day.temp_max,
                    self.unit,
                    day.temp_min,
                    self.unit,
                    day.icon.label()
                ),
                DailyForecast::Empty => "---".to_string(),
            });
        }

        out.push(match weather.minutes_since_update(now) {
            Some(0) => "Last update: Just now".to_string(),
            Some(min) => format!("Last update: {min} min ago"),
            None => "Last update: never".to_string(),
        });
        out.push(weather.last_status().caption().to_string());
        out
    }
}

impl Renderer for ConsoleRenderer {
    fn render(&mut self, weather: &WeatherState) {
        println!("── {} ──", Local::now().format("%H:%M:%S"));
        for line in self.lines(weather, Instant::now()) {
            println!("  {line}");
        }
    }
}

fn unit_suffix(units: &str) -> &'static str {
    match units {
        "imperial" => "°F",
        "standard" => "K",
        _ => "°C",
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_suffix_follows_unit_system() {
        assert_eq!(unit_suffix("imperial"), "°F");
        assert_eq!(unit_suffix("standard"), "K");
        assert_eq!(unit_suffix("metric"), "°C");
    }

    #[test]
    fn capitalize_first_letter_only() {
        assert_eq!(capitalize("light rain"), "Light rain");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn empty_state_renders_placeholders() {
        let renderer = ConsoleRenderer::new("metric");
        let lines = renderer.lines(&WeatherState::default(), Instant::now());

        assert_eq!(
            lines,
            vec![
                "No weather data yet",
                "---",
                "---",
                "---",
                "Last update: never",
                "Updating...",
            ]
        );
    }
}
