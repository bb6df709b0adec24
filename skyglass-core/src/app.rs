//! Orchestration context: owns the view state and every collaborator a
//! lookup touches.
//!
//! Each user action is an [`Attempt`] stamped with a generation number. Only
//! the most recently issued attempt may move the view out of `Loading` or
//! write Location Memory; older completions are dropped.
//!
//! [`WeatherApp::search`] and [`WeatherApp::locate`] hold `&mut self` across
//! their fetches, so they never overlap and never hit the stale check; only a
//! caller driving [`WeatherApp::begin`] and [`WeatherApp::complete`] itself can.

use std::sync::Arc;

use chrono::{Local, TimeZone, Utc};
use tracing::{debug, info, warn};

use crate::{
    WeatherError,
    error::AttemptKind,
    forecast,
    location::{DeviceLocator, resolve_from_text},
    memory::LocationMemory,
    model::{CurrentConditions, ForecastSample, QueryTarget, ViewState},
    provider::WeatherProvider,
    view::Presenter,
};

pub type FetchOutcome = Result<(CurrentConditions, Vec<ForecastSample>), WeatherError>;

/// Issue both requests for one target concurrently; fail as soon as either fails.
pub async fn fetch_weather(provider: &dyn WeatherProvider, target: &QueryTarget) -> FetchOutcome {
    tokio::try_join!(provider.fetch_current(target), provider.fetch_forecast(target))
}

/// Ticket for one in-flight lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    generation: u64,
    kind: AttemptKind,
}

impl Attempt {
    pub fn kind(&self) -> AttemptKind {
        self.kind
    }
}

pub struct WeatherApp<P: Presenter, Tz: TimeZone = Local> {
    provider: Arc<dyn WeatherProvider>,
    locator: DeviceLocator,
    memory: LocationMemory,
    presenter: P,
    tz: Tz,
    state: ViewState,
    issued: u64,
}

impl<P: Presenter, Tz: TimeZone> WeatherApp<P, Tz> {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        locator: DeviceLocator,
        memory: LocationMemory,
        presenter: P,
        tz: Tz,
    ) -> Self {
        Self {
            provider,
            locator,
            memory,
            presenter,
            tz,
            state: ViewState::Welcome,
            issued: 0,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn provider(&self) -> Arc<dyn WeatherProvider> {
        Arc::clone(&self.provider)
    }

    /// Show the welcome screen and return the remembered city, if any, for
    /// pre-filling the search input. Never fetches.
    pub fn startup(&mut self) -> Option<String> {
        self.set_state(ViewState::Welcome);
        self.memory.load_last().map(|stored| stored.city)
    }

    /// Start a new attempt and show the loading indicator.
    pub fn begin(&mut self, kind: AttemptKind) -> Attempt {
        let attempt = self.issue(kind);
        self.set_state(ViewState::Loading);
        attempt
    }

    /// Apply the outcome of `attempt`. Returns `false` when a newer attempt
    /// has been issued since, in which case nothing changes.
    pub fn complete(&mut self, attempt: Attempt, outcome: FetchOutcome) -> bool {
        if attempt.generation != self.issued {
            warn!(
                generation = attempt.generation,
                latest = self.issued,
                "dropping stale weather result"
            );
            return false;
        }

        match outcome {
            Ok((current, samples)) => {
                let forecast = forecast::reduce(&samples, &self.tz);
                let shown_at = Utc::now().with_timezone(&self.tz).naive_local();

                if let Err(err) = self.memory.save(&current.location_name, &current.country) {
                    warn!("could not remember location: {err:#}");
                }

                info!(
                    location = %current.location_name,
                    days = forecast.len(),
                    "showing weather"
                );
                self.set_state(ViewState::Weather { current, forecast, shown_at });
            }
            Err(err) => self.show_error(attempt.kind(), err),
        }

        true
    }

    /// Search by typed city name.
    pub async fn search(&mut self, input: &str) -> &ViewState {
        let target = match resolve_from_text(input) {
            Ok(target) => target,
            Err(err) => {
                self.issue(AttemptKind::Search);
                self.show_error(AttemptKind::Search, err);
                return &self.state;
            }
        };

        let attempt = self.begin(AttemptKind::Search);
        let outcome = fetch_weather(self.provider.as_ref(), &target).await;
        self.complete(attempt, outcome);
        &self.state
    }

    /// Look up weather for the device position.
    pub async fn locate(&mut self) -> &ViewState {
        if !self.locator.is_supported() {
            self.issue(AttemptKind::Device);
            self.show_error(AttemptKind::Device, WeatherError::Unsupported);
            return &self.state;
        }

        let attempt = self.begin(AttemptKind::Device);
        let outcome = match self.locator.resolve().await {
            Ok(target) => fetch_weather(self.provider.as_ref(), &target).await,
            Err(err) => Err(err),
        };
        self.complete(attempt, outcome);
        &self.state
    }

    fn issue(&mut self, kind: AttemptKind) -> Attempt {
        self.issued += 1;
        debug!(generation = self.issued, ?kind, "issued attempt");
        Attempt { generation: self.issued, kind }
    }

    fn show_error(&mut self, kind: AttemptKind, err: WeatherError) {
        debug!(?kind, %err, "attempt failed");
        self.set_state(ViewState::Error(kind.user_message(err).to_string()));
    }

    fn set_state(&mut self, state: ViewState) {
        self.state = state;
        self.presenter.render(&self.state);
    }
}
