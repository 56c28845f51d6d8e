//! Fetch-cycle orchestration.
//!
//! Handlers (`mount`, `refresh`, `submit_*`) return as soon as the cycle is
//! spawned. The spawned task resolves the location, calls the backend and
//! reports back on a channel; the owner feeds completions to [`Session::apply`].

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::{
    client::{HttpWeatherClient, WeatherBackend},
    config::Config,
    error::ClimaError,
    location::{LocationDescriptor, LocationSource},
    model::WeatherPayload,
    state::{Ticket, ViewModel, ViewState},
};

/// Result of one fetch cycle, tagged with the ticket that started it.
#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub outcome: Result<WeatherPayload, ClimaError>,
}

#[derive(Debug)]
pub struct Session {
    view: ViewModel,
    last: Option<LocationDescriptor>,
    source: LocationSource,
    backend: Arc<dyn WeatherBackend>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl Session {
    pub fn new(source: LocationSource, backend: Arc<dyn WeatherBackend>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            view: ViewModel::new(),
            last: None,
            source,
            backend,
            tx,
            rx,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            LocationSource::from_config(config),
            Arc::new(HttpWeatherClient::from_config(config)),
        )
    }

    pub fn state(&self) -> &ViewState {
        self.view.state()
    }

    pub fn suggests_manual_entry(&self) -> bool {
        self.view.suggests_manual_entry()
    }

    pub fn last_descriptor(&self) -> Option<&LocationDescriptor> {
        self.last.as_ref()
    }

    /// Start a cycle for `descriptor`. Must be called inside a tokio runtime.
    pub fn start(&mut self, descriptor: LocationDescriptor) -> Ticket {
        let ticket = self.view.begin();
        tracing::debug!(
            generation = ticket.generation(),
            kind = descriptor.kind(),
            "starting fetch cycle"
        );

        self.last = Some(descriptor.clone());

        let source = self.source.clone();
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let outcome = match source.resolve(&descriptor).await {
                Ok(target) => backend.fetch(&target).await,
                Err(err) => Err(err),
            };
            // The receiver lives as long as the session.
            let _ = tx.send(Completion { ticket, outcome });
        });

        ticket
    }

    pub fn mount(&mut self) -> Ticket {
        self.start(LocationDescriptor::Geolocation)
    }

    /// Weather for the current location again.
    pub fn refresh(&mut self) -> Ticket {
        self.start(LocationDescriptor::Geolocation)
    }

    /// Repeat the last cycle, or mount if none ran yet.
    pub fn retry(&mut self) -> Ticket {
        let descriptor = self.last.clone().unwrap_or(LocationDescriptor::Geolocation);
        self.start(descriptor)
    }

    /// `None` when the input is blank; nothing is fetched and the state is unchanged.
    pub fn submit_city(&mut self, input: &str) -> Option<Ticket> {
        LocationDescriptor::city(input).map(|d| self.start(d))
    }

    /// `None` unless both fields are numbers; nothing is fetched otherwise.
    pub fn submit_coordinates(&mut self, lat: &str, lon: &str) -> Option<Ticket> {
        LocationDescriptor::coordinates(lat, lon).map(|d| self.start(d))
    }

    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.rx.recv().await
    }

    /// Returns whether the completion was applied.
    pub fn apply(&mut self, completion: Completion) -> bool {
        self.view.complete(completion.ticket, completion.outcome)
    }

    /// Apply completions until the view leaves `Loading`. Returns at once
    /// when no cycle has been started, since nothing would ever complete.
    pub async fn settle(&mut self) -> &ViewState {
        while self.view.has_started() && self.view.state().is_loading() {
            match self.rx.recv().await {
                Some(completion) => {
                    self.apply(completion);
                }
                None => break,
            }
        }
        self.view.state()
    }
}
