//! Polling cadence and the published weather snapshot.
//!
//! A cycle walks `Idle -> FetchingCurrent -> FetchingForecast -> Idle`. The
//! forecast is only requested once current conditions succeeded, and a
//! failed step returns to `Idle` leaving every published value as it was.

use log::{debug, info, warn};
use std::time::Duration;
use tokio::{
    sync::watch,
    time::{Instant, MissedTickBehavior},
};

use crate::{
    client::{Transport, WeatherClient},
    config::Config,
    error::FetchError,
    forecast::{self, FORECAST_DAYS},
    model::{CurrentConditions, DailyForecast, FetchStatus},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    FetchingCurrent,
    FetchingForecast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Both fetches succeeded and both snapshots were replaced.
    Updated,
    /// Current conditions were published, the forecast was kept.
    ForecastFailed(FetchError),
    /// Nothing was published.
    CurrentFailed(FetchError),
    /// A cycle was already in flight.
    Skipped,
}

/// Read-only view handed to the rendering layer.
#[derive(Debug, Clone, Default)]
pub struct WeatherState {
    current: Option<CurrentConditions>,
    forecast: [DailyForecast; FORECAST_DAYS],
    last_status: FetchStatus,
    last_success: Option<Instant>,
}

impl WeatherState {
    pub fn current(&self) -> Option<&CurrentConditions> {
        self.current.as_ref()
    }

    pub fn forecast(&self) -> &[DailyForecast; FORECAST_DAYS] {
        &self.forecast
    }

    pub fn last_status(&self) -> FetchStatus {
        self.last_status
    }

    /// When current conditions were last replaced.
    pub fn last_success(&self) -> Option<Instant> {
        self.last_success
    }

    /// Whole minutes since the last successful update, if any.
    pub fn minutes_since_update(&self, now: Instant) -> Option<u64> {
        self.last_success
            .map(|at| now.saturating_duration_since(at).as_secs() / 60)
    }
}

/// Consumer of published snapshots.
pub trait Renderer {
    fn render(&mut self, weather: &WeatherState);
}

pub struct UpdateScheduler<T> {
    client: WeatherClient<T>,
    config: Config,
    interval: Duration,
    state: SchedulerState,
    last_started: Option<Instant>,
    weather: WeatherState,
}

impl<T: Transport> UpdateScheduler<T> {
    pub fn new(client: WeatherClient<T>, config: Config) -> Self {
        let interval = config.effective_update_interval();
        Self {
            client,
            config,
            interval,
            state: SchedulerState::Idle,
            last_started: None,
            weather: WeatherState::default(),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn weather(&self) -> &WeatherState {
        &self.weather
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn client(&self) -> &WeatherClient<T> {
        &self.client
    }

    /// True before the first cycle and once the interval has elapsed since
    /// the last one started.
    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_started {
            None => true,
            Some(at) => now.saturating_duration_since(at) >= self.interval,
        }
    }

    /// Run a cycle if one is due. For hosts that drive their own loop.
    pub async fn poll(&mut self, now: Instant) -> Option<CycleOutcome> {
        if !self.is_due(now) {
            return None;
        }
        Some(self.run_cycle().await)
    }

    /// Fetch current conditions and, if that worked, the forecast.
    ///
    /// Cancel-safe: dropping the future mid-fetch returns the scheduler to
    /// `Idle` with the published snapshot untouched.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        if self.state != SchedulerState::Idle {
            warn!("Update already in progress ({:?}), not starting another", self.state);
            return CycleOutcome::Skipped;
        }
        self.last_started = Some(Instant::now());

        let mut cycle = CycleGuard::enter(&mut self.state);
        let current = match self.client.fetch_current(&self.config).await {
            Ok(current) => current,
            Err(err) => {
                self.weather.last_status = err.status();
                return CycleOutcome::CurrentFailed(err);
            }
        };
        self.weather.current = Some(current);
        self.weather.last_success = Some(Instant::now());
        self.weather.last_status = FetchStatus::Ok;

        cycle.advance(SchedulerState::FetchingForecast);
        match self.client.fetch_forecast(&self.config).await {
            Ok(samples) => {
                self.weather.forecast = forecast::reduce(&samples, None);
                let days = self.weather.forecast.iter().filter(|d| d.is_valid()).count();
                info!("Weather updated: {days} forecast day(s)");
                CycleOutcome::Updated
            }
            Err(err) => {
                self.weather.last_status = err.status();
                CycleOutcome::ForecastFailed(err)
            }
        }
    }

    /// Drive cycles every interval until `shutdown` fires, publishing each
    /// result through `renderer`. The first cycle starts immediately.
    pub async fn run<R: Renderer>(&mut self, renderer: &mut R, mut shutdown: watch::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Update loop started, interval {} s", self.interval.as_secs());
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let outcome = self.run_cycle().await;
                    debug!("Cycle finished: {outcome:?}");
                    renderer.render(&self.weather);
                }
                // A closed channel disables this branch; only a send stops the loop.
                Ok(()) = shutdown.changed() => {
                    info!("Shutdown requested, stopping update loop");
                    break;
                }
            }
        }
    }
}

/// Holds the scheduler out of `Idle` for one cycle and puts it back on drop,
/// whether the cycle returned or its future was cancelled.
struct CycleGuard<'a> {
    state: &'a mut SchedulerState,
}

impl<'a> CycleGuard<'a> {
    fn enter(state: &'a mut SchedulerState) -> Self {
        *state = SchedulerState::FetchingCurrent;
        Self { state }
    }

    fn advance(&mut self, next: SchedulerState) {
        *self.state = next;
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        *self.state = SchedulerState::Idle;
    }
}
