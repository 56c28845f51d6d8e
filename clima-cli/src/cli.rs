use anyhow::{Context, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use clima_core::{
    Config, GeolocationMode, IconPolicy, LocationSource, MarkupPolicy, Session, ViewState,
};
use std::{process::ExitCode, sync::Arc};

use crate::render::{self, RenderOptions};
use crate::{configure, consent, interactive};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "clima", version, about = "Current weather and suggestions for where you are")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Icon policy: "auto" (description keywords) or "temperature".
    #[arg(long, global = true, value_parser = parse_icons)]
    pub icons: Option<IconPolicy>,

    /// How to show markup suggestions: "trusted" (verbatim) or "plain".
    #[arg(long, global = true, value_parser = parse_markup)]
    pub markup: Option<MarkupPolicy>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Weather for the current location (the default).
    Show,

    /// Weather for a city.
    City {
        /// City name, e.g. "New Delhi".
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },

    /// Weather for explicit coordinates.
    Coords {
        /// Latitude in decimal degrees.
        #[arg(allow_hyphen_values = true)]
        lat: String,

        /// Longitude in decimal degrees.
        #[arg(allow_hyphen_values = true)]
        lon: String,
    },

    /// Keep the view open: refresh, search cities, enter coordinates.
    Interactive,

    /// Set backend URLs and location preferences.
    Configure,
}

fn parse_icons(value: &str) -> Result<IconPolicy, String> {
    IconPolicy::try_from(value).map_err(|e| e.to_string())
}

fn parse_markup(value: &str) -> Result<MarkupPolicy, String> {
    MarkupPolicy::try_from(value).map_err(|e| e.to_string())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let config = Config::load_with_env().context("Failed to load configuration")?;
        tracing::debug!(?config, "configuration loaded");

        let opts = RenderOptions {
            icons: self.icons.unwrap_or(config.icon_policy),
            markup: self.markup.unwrap_or(config.markup),
        };

        let mut session = session_for(&config);

        match self.command.unwrap_or(Command::Show) {
            Command::Show => {
                session.mount();
            }
            Command::City { name } => {
                if session.submit_city(&name.join(" ")).is_none() {
                    bail!("City name must not be empty");
                }
            }
            Command::Coords { lat, lon } => {
                if session.submit_coordinates(&lat, &lon).is_none() {
                    bail!("Latitude and longitude must both be numbers (got '{lat}', '{lon}')");
                }
            }
            Command::Interactive => {
                interactive::run(&mut session, opts).await?;
                return Ok(ExitCode::SUCCESS);
            }
            Command::Configure => {
                configure::run(config)?;
                return Ok(ExitCode::SUCCESS);
            }
        }

        session.settle().await;
        let state = session.state();
        let manual_entry = session.suggests_manual_entry();
        print!("{}", render::render(state, opts, manual_entry, Some(Local::now())));

        Ok(match state {
            ViewState::Error(_) => ExitCode::FAILURE,
            _ => ExitCode::SUCCESS,
        })
    }
}

fn session_for(config: &Config) -> Session {
    let mut source = LocationSource::from_config(config);
    if config.geolocation == GeolocationMode::Ip {
        source = consent::guard(source, config.ask_before_locating);
    }
    Session::new(source, Arc::new(clima_core::HttpWeatherClient::from_config(config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_show() {
        let cli = Cli::try_parse_from(["clima"]).expect("parse");
        assert!(cli.command.is_none());
    }

    #[test]
    fn city_words_are_collected() {
        let cli = Cli::try_parse_from(["clima", "city", "New", "Delhi"]).expect("parse");
        match cli.command {
            Some(Command::City { name }) => assert_eq!(name.join(" "), "New Delhi"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn negative_coordinates_parse() {
        let cli = Cli::try_parse_from(["clima", "coords", "-33.8688", "151.2093"]).expect("parse");
        match cli.command {
            Some(Command::Coords { lat, lon }) => {
                assert_eq!(lat, "-33.8688");
                assert_eq!(lon, "151.2093");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_policies_parse() {
        let cli = Cli::try_parse_from([
            "clima",
            "show",
            "--icons",
            "temperature",
            "--markup",
            "plain",
        ])
        .expect("parse");
        assert_eq!(cli.icons, Some(IconPolicy::Temperature));
        assert_eq!(cli.markup, Some(MarkupPolicy::Plain));

        assert!(Cli::try_parse_from(["clima", "--markup", "html"]).is_err());
    }
}
