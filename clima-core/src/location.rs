//! Where to fetch weather for.
//!
//! A fetch cycle starts from a [`LocationDescriptor`]. Manual entries are
//! validated synchronously when the descriptor is built; the geolocation
//! variant is resolved asynchronously by a [`LocationSource`] into a
//! [`Target`], which fixes the endpoint shape the client will use.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, sync::Arc};

use crate::{config::Config, error::ClimaError, model::Coordinates};

/// How to fetch weather for one cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationDescriptor {
    Geolocation,
    City(String),
    Coordinates(Coordinates),
}

impl LocationDescriptor {
    /// City form input. `None` for blank input, which must not start a fetch.
    pub fn city(input: &str) -> Option<Self> {
        let name = input.trim();
        if name.is_empty() {
            return None;
        }
        Some(LocationDescriptor::City(name.to_string()))
    }

    /// Coordinate form input. `None` unless both fields parse as finite numbers.
    pub fn coordinates(lat: &str, lon: &str) -> Option<Self> {
        let lat = parse_degrees(lat)?;
        let lon = parse_degrees(lon)?;
        Some(LocationDescriptor::Coordinates(Coordinates::new(lat, lon)))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LocationDescriptor::Geolocation => "geolocation",
            LocationDescriptor::City(_) => "city",
            LocationDescriptor::Coordinates(_) => "coordinates",
        }
    }
}

fn parse_degrees(input: &str) -> Option<f64> {
    input.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A descriptor after location resolution. Each variant maps to one endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// Coordinates from geolocation, sent as a JSON body.
    Located(Coordinates),
    /// Let the backend pick the location itself.
    ServerDefault,
    City(String),
    /// Coordinates typed by the user, embedded in the path.
    Coordinates(Coordinates),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeolocationMode {
    /// Approximate position from an IP lookup service.
    #[default]
    Ip,
    /// The backend's own default location (`GET /weather`).
    Server,
    /// No geolocation capability.
    Off,
}

impl GeolocationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeolocationMode::Ip => "ip",
            GeolocationMode::Server => "server",
            GeolocationMode::Off => "off",
        }
    }

    pub const fn all() -> &'static [GeolocationMode] {
        &[GeolocationMode::Ip, GeolocationMode::Server, GeolocationMode::Off]
    }
}

impl std::fmt::Display for GeolocationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for GeolocationMode {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "ip" => Ok(GeolocationMode::Ip),
            "server" => Ok(GeolocationMode::Server),
            "off" => Ok(GeolocationMode::Off),
            _ => Err(anyhow::anyhow!(
                "Unknown geolocation mode '{value}'. Supported modes: ip, server, off."
            )),
        }
    }
}

/// Single-shot acquisition of the current position.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, ClimaError>;
}

/// The capability is missing entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

#[async_trait]
impl Geolocator for Unsupported {
    async fn locate(&self) -> Result<Coordinates, ClimaError> {
        Err(ClimaError::GeolocationUnsupported)
    }
}

/// Approximate geolocation through an ip-api.com style lookup.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

impl IpGeolocator {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: Client::new(),
        }
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn locate(&self) -> Result<Coordinates, ClimaError> {
        tracing::debug!(url = %self.url, "looking up approximate location");

        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ClimaError::GeolocationDenied(format!("lookup request failed: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            return Err(ClimaError::GeolocationDenied(format!(
                "lookup returned status {status}"
            )));
        }

        let body: IpLookupResponse = res
            .json()
            .await
            .map_err(|e| {
                ClimaError::GeolocationDenied(format!("unreadable lookup response: {e}"))
            })?;

        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(lat), Some(lon)) => {
                tracing::info!(lat, lon, "location resolved");
                Ok(Coordinates::new(lat, lon))
            }
            _ => Err(ClimaError::GeolocationDenied(
                body.message.unwrap_or_else(|| format!("lookup status '{}'", body.status)),
            )),
        }
    }
}

/// Resolves descriptors into request targets.
#[derive(Debug, Clone)]
pub enum LocationSource {
    Device(Arc<dyn Geolocator>),
    ServerSide,
}

impl LocationSource {
    pub fn from_config(config: &Config) -> Self {
        match config.geolocation {
            GeolocationMode::Ip => {
                LocationSource::Device(Arc::new(IpGeolocator::new(config.geolocation_url.clone())))
            }
            GeolocationMode::Server => LocationSource::ServerSide,
            GeolocationMode::Off => LocationSource::Device(Arc::new(Unsupported)),
        }
    }

    pub async fn resolve(&self, descriptor: &LocationDescriptor) -> Result<Target, ClimaError> {
        match descriptor {
            LocationDescriptor::City(name) => Ok(Target::City(name.clone())),
            LocationDescriptor::Coordinates(coords) => Ok(Target::Coordinates(*coords)),
            LocationDescriptor::Geolocation => match self {
                LocationSource::ServerSide => Ok(Target::ServerDefault),
                LocationSource::Device(geolocator) => {
                    geolocator.locate().await.map(Target::Located)
                }
            },
        }
    }
}
