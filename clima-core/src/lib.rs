//! Core library for the `clima` weather client.
//!
//! This crate defines:
//! - Location resolution (geolocation, city name, explicit coordinates)
//! - The backend client and its endpoint selection
//! - The `Loading`/`Error`/`Ready` view state and the fetch-cycle session
//! - Pure presentation helpers (icons, theme class, suggestions)
//!
//! It is used by `clima-cli`, but can also be reused by other front ends.

pub mod client;
pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod presenter;
pub mod session;
pub mod state;

pub use client::{HttpWeatherClient, RequestPlan, WeatherBackend};
pub use config::Config;
pub use error::ClimaError;
pub use location::{GeolocationMode, Geolocator, LocationDescriptor, LocationSource, Target};
pub use model::{Coordinates, WeatherPayload};
pub use presenter::{Card, IconPolicy, MarkupPolicy, Suggestions};
pub use session::{Completion, Session};
pub use state::{Ticket, ViewModel, ViewState};
