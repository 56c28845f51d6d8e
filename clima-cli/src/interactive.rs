use chrono::Local;
use clima_core::{Session, ViewState};
use inquire::{InquireError, Select, Text};
use std::fmt;

use crate::render::{self, RenderOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    TryAgain,
    Refresh,
    SearchCity,
    EnterCoordinates,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::TryAgain => "Try again",
            Action::Refresh => "🔄 Refresh current location",
            Action::SearchCity => "📍 Check weather for a city",
            Action::EnterCoordinates => "🧭 Enter coordinates",
            Action::Quit => "Quit",
        })
    }
}

fn actions_for(state: &ViewState) -> Vec<Action> {
    let mut actions = Vec::with_capacity(5);
    if matches!(state, ViewState::Error(_)) {
        actions.push(Action::TryAgain);
    }
    actions.extend([
        Action::Refresh,
        Action::SearchCity,
        Action::EnterCoordinates,
        Action::Quit,
    ]);
    actions
}

/// Mount, then loop between rendering the view and asking what to do next.
pub async fn run(session: &mut Session, opts: RenderOptions) -> anyhow::Result<()> {
    session.mount();

    loop {
        if session.state().is_loading() {
            println!("{}", render::render(session.state(), opts, false, None));
        }
        session.settle().await;
        let state = session.state();
        let manual_entry = session.suggests_manual_entry();
        println!("{}", render::render(state, opts, manual_entry, Some(Local::now())));

        let action = match Select::new("What next?", actions_for(state)).prompt() {
            Ok(action) => action,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        match action {
            Action::TryAgain => {
                session.retry();
            }
            Action::Refresh => {
                session.refresh();
            }
            Action::SearchCity => {
                let Some(name) = ask("City name", "e.g. Mumbai, London, New York")? else {
                    continue;
                };
                // Blank input starts nothing; the current view stays.
                session.submit_city(&name);
            }
            Action::EnterCoordinates => {
                let Some(lat) = ask("Latitude", "e.g. 12.97")? else {
                    continue;
                };
                let Some(lon) = ask("Longitude", "e.g. 77.59")? else {
                    continue;
                };
                session.submit_coordinates(&lat, &lon);
            }
            Action::Quit => break,
        }
    }

    Ok(())
}

/// `None` when the user backs out with Esc.
fn ask(label: &str, placeholder: &str) -> anyhow::Result<Option<String>> {
    match Text::new(label).with_placeholder(placeholder).prompt() {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
