use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Client, Method};
use serde_json::json;
use std::fmt::Debug;

use crate::{config::Config, error::ClimaError, location::Target, model::WeatherPayload};

/// Characters left as-is in a single path component (same set as JavaScript's
/// `encodeURIComponent`).
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Anything that can answer a weather request for a resolved target.
#[async_trait]
pub trait WeatherBackend: Send + Sync + Debug {
    async fn fetch(&self, target: &Target) -> Result<WeatherPayload, ClimaError>;
}

/// The HTTP request a target maps to.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPlan {
    pub method: Method,
    pub url: String,
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct HttpWeatherClient {
    weather_base_url: Option<String>,
    city_base_url: Option<String>,
    http: Client,
}

impl HttpWeatherClient {
    pub fn new(weather_base_url: Option<String>, city_base_url: Option<String>) -> Self {
        Self {
            weather_base_url,
            city_base_url,
            http: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.weather_base_url.clone(), config.city_base_url.clone())
    }

    /// Endpoint selection. Pure: depends only on the target and the base URLs.
    pub fn plan(&self, target: &Target) -> Result<RequestPlan, ClimaError> {
        let plan = match target {
            Target::Located(coords) => RequestPlan {
                method: Method::POST,
                url: format!("{}/location", base(&self.weather_base_url, "weather")?),
                body: Some(json!({ "lat": coords.lat, "lon": coords.lon })),
            },
            Target::ServerDefault => RequestPlan {
                method: Method::GET,
                url: format!("{}/weather", base(&self.weather_base_url, "weather")?),
                body: None,
            },
            Target::City(name) => RequestPlan {
                method: Method::GET,
                url: format!(
                    "{}/{}",
                    base(&self.city_base_url, "city")?,
                    utf8_percent_encode(name, COMPONENT)
                ),
                body: None,
            },
            Target::Coordinates(coords) => RequestPlan {
                method: Method::GET,
                url: format!(
                    "{}/weather/{}/{}",
                    base(&self.weather_base_url, "weather")?,
                    coords.lat,
                    coords.lon
                ),
                body: None,
            },
        };

        Ok(plan)
    }
}

fn base<'a>(url: &'a Option<String>, which: &str) -> Result<&'a str, ClimaError> {
    match url.as_deref().map(|u| u.trim_end_matches('/')) {
        Some(u) if !u.is_empty() => Ok(u),
        _ => {
            tracing::warn!("no {which} base URL configured; request cannot be built");
            Err(ClimaError::FetchFailed { status: None })
        }
    }
}

#[async_trait]
impl WeatherBackend for HttpWeatherClient {
    async fn fetch(&self, target: &Target) -> Result<WeatherPayload, ClimaError> {
        let plan = self.plan(target)?;
        tracing::debug!(method = %plan.method, url = %plan.url, "sending weather request");

        let mut req = self.http.request(plan.method, &plan.url);
        if let Some(body) = &plan.body {
            req = req.json(body);
        }

        let res = req.send().await.map_err(|e| {
            tracing::warn!(error = %e, "weather request could not be sent");
            ClimaError::from(e)
        })?;

        let status = res.status();
        if !status.is_success() {
            tracing::warn!(%status, url = %plan.url, "weather request failed");
            return Err(ClimaError::FetchFailed {
                status: Some(status.as_u16()),
            });
        }

        let body = res.text().await?;
        WeatherPayload::from_json(&body)
    }
}
