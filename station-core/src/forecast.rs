//! Reduction of the 3-hourly forecast feed to the three day slots shown on
//! the display.
//!
//! The feed starts with entries for the current day, which are not a distinct
//! forecast day and are skipped. For every following calendar day only the
//! first entry is kept; with 3-hour granularity that is usually an early
//! reading of the day. Days are computed in UTC.
//!
//! The feed must be ordered by timestamp. It is not re-sorted: an entry older
//! than the one before it is dropped with a warning instead of opening a new
//! slot.

use chrono::{DateTime, Datelike};
use log::{debug, warn};

use crate::{
    icons::{self, CLEAR_SKY_DAY_CODE},
    model::{DailyForecast, DaySummary, ForecastSample},
};

pub const FORECAST_DAYS: usize = 3;

const WEEKDAY_SHORT: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Reduce `samples` to [`FORECAST_DAYS`] slots.
///
/// `reference_day` is the day-of-month treated as "today"; when `None`, the
/// day of the first sample is used.
pub fn reduce(
    samples: &[ForecastSample],
    reference_day: Option<u32>,
) -> [DailyForecast; FORECAST_DAYS] {
    let mut slots: [DailyForecast; FORECAST_DAYS] = Default::default();

    let Some(first) = samples.first() else {
        return slots;
    };

    let reference_day = match reference_day.or_else(|| calendar_day(first.timestamp).map(|(day, _)| day)) {
        Some(day) => day,
        None => {
            warn!("First forecast sample has an invalid timestamp ({})", first.timestamp);
            return slots;
        }
    };

    let mut filled = 0;
    let mut slot_day: Option<u32> = None;
    let mut last_timestamp: Option<i64> = None;

    for sample in samples {
        if filled == FORECAST_DAYS {
            break;
        }

        if last_timestamp.is_some_and(|prev| sample.timestamp < prev) {
            warn!("Forecast sample at {} is out of order, skipped", sample.timestamp);
            continue;
        }

        let Some((day, weekday)) = calendar_day(sample.timestamp) else {
            warn!("Forecast sample has an invalid timestamp ({}), skipped", sample.timestamp);
            continue;
        };
        last_timestamp = Some(sample.timestamp);

        if day == reference_day || slot_day == Some(day) {
            continue;
        }

        let icon_code = if sample.icon_code.is_empty() {
            CLEAR_SKY_DAY_CODE.to_string()
        } else {
            sample.icon_code.clone()
        };

        debug!(
            "Forecast slot {filled}: {weekday} (day {day}) {:.1}/{:.1} {icon_code}",
            sample.temp_max, sample.temp_min
        );

        slots[filled] = DailyForecast::Valid(DaySummary {
            weekday: weekday.to_string(),
            temp_min: sample.temp_min,
            temp_max: sample.temp_max,
            icon: icons::resolve(&icon_code),
            icon_code,
        });
        slot_day = Some(day);
        filled += 1;
    }

    slots
}

/// UTC day-of-month and short weekday name of an epoch timestamp.
fn calendar_day(timestamp: i64) -> Option<(u32, &'static str)> {
    let dt = DateTime::from_timestamp(timestamp, 0)?;
    let weekday = WEEKDAY_SHORT[dt.weekday().num_days_from_sunday() as usize];
    Some((dt.day(), weekday))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icons::AssetId;
    use chrono::{TimeZone, Utc};

    fn at(day: u32, hour: u32) -> i64 {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap().timestamp()
    }

    fn sample(timestamp: i64, max: f64, min: f64, icon: &str) -> ForecastSample {
        ForecastSample {
            timestamp,
            temp_min: min,
            temp_max: max,
            icon_code: icon.to_string(),
        }
    }

    fn valid(slot: &DailyForecast) -> &DaySummary {
        slot.summary().expect("slot should be valid")
    }

    #[test]
    fn empty_feed_yields_three_empty_slots() {
        let slots = reduce(&[], None);
        assert!(slots.iter().all(|s| *s == DailyForecast::Empty));
    }

    #[test]
    fn keeps_first_sample_of_each_day_after_today() {
        let samples = [
            sample(at(15, 9), 20.0, 10.0, "A"),
            sample(at(15, 12), 22.0, 12.0, "B"),
            sample(at(16, 9), 18.0, 9.0, "C"),
            sample(at(16, 12), 19.0, 10.0, "D"),
            sample(at(17, 9), 15.0, 5.0, "E"),
        ];

        let slots = reduce(&samples, Some(15));

        let first = valid(&slots[0]);
        assert_eq!(first.weekday, "Sat");
        assert_eq!((first.temp_max, first.temp_min), (18.0, 9.0));
        assert_eq!(first.icon_code, "C");

        let second = valid(&slots[1]);
        assert_eq!(second.weekday, "Sun");
        assert_eq!((second.temp_max, second.temp_min), (15.0, 5.0));
        assert_eq!(second.icon_code, "E");

        assert_eq!(slots[2], DailyForecast::Empty);
    }

    #[test]
    fn reference_day_defaults_to_first_sample() {
        let samples = [
            sample(at(15, 21), 11.0, 8.0, "01n"),
            sample(at(16, 0), 10.0, 7.0, "02n"),
        ];

        let slots = reduce(&samples, None);

        assert_eq!(valid(&slots[0]).icon_code, "02n");
        assert_eq!(valid(&slots[0]).icon, AssetId::FewCloudsNight);
        assert!(!slots[1].is_valid());
    }

    #[test]
    fn extra_days_beyond_three_are_ignored() {
        let samples: Vec<_> = (15..=20)
            .map(|day| sample(at(day, 12), day as f64, 0.0, "10d"))
            .collect();

        let slots = reduce(&samples, None);

        assert!(slots.iter().all(DailyForecast::is_valid));
        let maxima: Vec<f64> = slots.iter().map(|s| valid(s).temp_max).collect();
        assert_eq!(maxima, vec![16.0, 17.0, 18.0]);
    }

    #[test]
    fn empty_icon_defaults_to_clear_sky_day() {
        let samples = [sample(at(15, 12), 1.0, 0.0, "01d"), sample(at(16, 12), 2.0, 1.0, "")];

        let slots = reduce(&samples, None);

        assert_eq!(valid(&slots[0]).icon_code, CLEAR_SKY_DAY_CODE);
        assert_eq!(valid(&slots[0]).icon, AssetId::ClearDay);
    }

    #[test]
    fn out_of_order_samples_are_skipped() {
        let samples = [
            sample(at(15, 12), 0.0, 0.0, "01d"),
            sample(at(16, 12), 16.0, 6.0, "01d"),
            sample(at(17, 12), 17.0, 7.0, "01d"),
            // Stale entry for the 16th must not open a second slot for it.
            sample(at(16, 15), 99.0, 99.0, "11d"),
            sample(at(18, 12), 18.0, 8.0, "01d"),
        ];

        let slots = reduce(&samples, None);

        let maxima: Vec<f64> = slots.iter().map(|s| valid(s).temp_max).collect();
        assert_eq!(maxima, vec![16.0, 17.0, 18.0]);
    }

    #[test]
    fn month_rollover_counts_as_new_day() {
        let end = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap().timestamp();
        let next = Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap().timestamp();

        let slots = reduce(&[sample(end, 1.0, 0.0, "01d"), sample(next, 2.0, 1.0, "13d")], None);

        assert_eq!(valid(&slots[0]).weekday, "Mon");
        assert_eq!(valid(&slots[0]).icon, AssetId::SnowDay);
    }
}
