use crate::{error::ClimaError, model::WeatherPayload};

/// What the client is showing.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Error(String),
    Ready(WeatherPayload),
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn payload(&self) -> Option<&WeatherPayload> {
        match self {
            ViewState::Ready(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Identifies one fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// The view state plus the generation guard that decides which completion
/// may write to it.
#[derive(Debug)]
pub struct ViewModel {
    state: ViewState,
    generation: u64,
    manual_entry: bool,
}

impl Default for ViewModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewModel {
    pub fn new() -> Self {
        Self {
            state: ViewState::Loading,
            generation: 0,
            manual_entry: false,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Whether any cycle has been started.
    pub fn has_started(&self) -> bool {
        self.generation > 0
    }

    /// The current error came from geolocation, so a city or coordinates
    /// would get past it.
    pub fn suggests_manual_entry(&self) -> bool {
        self.manual_entry
    }

    /// Start a cycle: drop whatever was shown and issue a fresh ticket.
    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        self.state = ViewState::Loading;
        self.manual_entry = false;
        tracing::debug!(generation = self.generation, "view -> loading");
        Ticket {
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.generation == self.generation
    }

    /// Apply a finished cycle. Returns `false` and leaves the state untouched
    /// when a newer cycle has started since `ticket` was issued.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: Result<WeatherPayload, ClimaError>,
    ) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                stale = ticket.generation,
                current = self.generation,
                "discarding superseded completion"
            );
            return false;
        }

        self.state = match outcome {
            Ok(payload) => {
                tracing::debug!(generation = ticket.generation, "view -> ready");
                ViewState::Ready(payload)
            }
            Err(err) => {
                tracing::warn!(generation = ticket.generation, error = %err, "view -> error");
                self.manual_entry = err.suggests_manual_entry();
                ViewState::Error(err.user_message())
            }
        };
        true
    }
}
