use chrono::{DateTime, Local};
use clima_core::{
    Card, IconPolicy, MarkupPolicy, Suggestions, ViewState, presenter::markup_to_lines,
};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub icons: IconPolicy,
    pub markup: MarkupPolicy,
}

pub const MANUAL_ENTRY_HINT: &str = "💡 Search for a city or enter coordinates instead.";

/// Text for the current view state. `manual_entry` adds a pointer to city or
/// coordinate search under an error that came from geolocation.
pub fn render(
    state: &ViewState,
    opts: RenderOptions,
    manual_entry: bool,
    updated: Option<DateTime<Local>>,
) -> String {
    match state {
        ViewState::Loading => "⏳ Loading weather data...\n".to_string(),
        ViewState::Error(message) if manual_entry => {
            format!("⚠️  Error\n{message}\n{MANUAL_ENTRY_HINT}\n")
        }
        ViewState::Error(message) => format!("⚠️  Error\n{message}\n"),
        ViewState::Ready(payload) => render_card(&Card::new(payload, opts.icons), opts, updated),
    }
}

fn render_card(card: &Card, opts: RenderOptions, updated: Option<DateTime<Local>>) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "🌤️ Clima · {}", card.theme);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", card.label.as_deref().unwrap_or("Unknown location"));
    if let Some(coords) = &card.coordinates {
        let _ = writeln!(out, "📍 {coords}");
    }
    let _ = writeln!(out);

    match &card.description {
        Some(description) => {
            let _ = writeln!(out, "{} {}  {}", card.icon, card.temperature, description);
        }
        None => {
            let _ = writeln!(out, "{} {}", card.icon, card.temperature);
        }
    }
    let _ = writeln!(out, "Humidity  💧 {}", card.humidity);

    if let Some(suggestions) = &card.suggestions {
        let _ = writeln!(out);
        let _ = writeln!(out, "Suggestions");
        match (suggestions, opts.markup) {
            (Suggestions::Markup(markup), MarkupPolicy::Trusted) => {
                let _ = writeln!(out, "{}", markup.trim_end());
            }
            (Suggestions::Markup(markup), MarkupPolicy::Plain) => {
                for line in markup_to_lines(markup) {
                    let _ = writeln!(out, "  • {line}");
                }
            }
            (Suggestions::Items(items), _) => {
                for item in items {
                    let _ = writeln!(out, "  • {item}");
                }
            }
        }
    }

    if let Some(at) = updated {
        let _ = writeln!(out);
        let _ = writeln!(out, "Updated {}", at.format("%H:%M:%S"));
    }

    out
}
