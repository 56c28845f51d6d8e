use anyhow::Context;
use clima_core::{Config, GeolocationMode, MarkupPolicy};
use inquire::{Confirm, Select, Text};

/// Prompt for every setting, starting from the current values, then save.
pub fn run(mut config: Config) -> anyhow::Result<()> {
    config.weather_base_url = optional_url(
        "Weather service base URL",
        "serves /weather and /location",
        config.weather_base_url.as_deref(),
    )?;
    config.city_base_url = optional_url(
        "City search base URL",
        "the city name is appended as a path segment",
        config.city_base_url.as_deref(),
    )?;

    let modes = GeolocationMode::all().to_vec();
    let current = modes.iter().position(|m| *m == config.geolocation).unwrap_or(0);
    config.geolocation = Select::new("How should your location be found?", modes)
        .with_starting_cursor(current)
        .with_help_message("ip: lookup service, server: let the backend decide, off: never")
        .prompt()?;

    if config.geolocation == GeolocationMode::Ip {
        config.ask_before_locating = Confirm::new("Ask before each location lookup?")
            .with_default(config.ask_before_locating)
            .prompt()?;
    }

    let policies = vec![MarkupPolicy::Trusted, MarkupPolicy::Plain];
    let current = policies.iter().position(|p| *p == config.markup).unwrap_or(0);
    config.markup = Select::new("Suggestion markup from the backend", policies)
        .with_starting_cursor(current)
        .with_help_message("trusted: print as sent, plain: strip tags")
        .prompt()?;

    let path = config.save().context("Failed to save configuration")?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn optional_url(label: &str, help: &str, current: Option<&str>) -> anyhow::Result<Option<String>> {
    let answer = Text::new(label)
        .with_default(current.unwrap_or_default())
        .with_help_message(help)
        .prompt()?;

    let trimmed = answer.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

