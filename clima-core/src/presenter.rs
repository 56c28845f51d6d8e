//! Display attributes derived from a weather payload.
//!
//! Everything here is a pure function of the payload; nothing feeds back
//! into fetched data.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::model::WeatherPayload;

/// Temperature band. Boundaries at 10, 20 and 30 °C, inclusive lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    Cold,
    Cool,
    Warm,
    Hot,
}

impl Band {
    pub fn from_celsius(temperature: f64) -> Self {
        if temperature < 10.0 {
            Band::Cold
        } else if temperature < 20.0 {
            Band::Cool
        } else if temperature < 30.0 {
            Band::Warm
        } else {
            Band::Hot
        }
    }

    /// Theme class name.
    pub fn css_class(&self) -> &'static str {
        match self {
            Band::Cold => "cold",
            Band::Cool => "cool",
            Band::Warm => "warm",
            Band::Hot => "hot",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Band::Cold => "❄️",
            Band::Cool => "🌤️",
            Band::Warm => "☀️",
            Band::Hot => "🔥",
        }
    }
}

/// Condition recognised from a free-text description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Rain,
    Snow,
    Cloudy,
    Fog,
    Storm,
    Clear,
    PartlyCloudy,
    Scattered,
    Unknown,
}

/// Checked in order; the first hit wins.
const KEYWORDS: &[(&[&str], Condition)] = &[
    (&["rain", "drizzle"], Condition::Rain),
    (&["snow"], Condition::Snow),
    (&["cloud", "overcast"], Condition::Cloudy),
    (&["mist", "fog", "haze"], Condition::Fog),
    (&["thunder", "storm"], Condition::Storm),
    (&["clear"], Condition::Clear),
    (&["partly"], Condition::PartlyCloudy),
    (&["scattered"], Condition::Scattered),
];

impl Condition {
    pub fn from_description(description: &str) -> Self {
        let lower = description.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(words, _)| words.iter().any(|w| lower.contains(w)))
            .map(|(_, condition)| *condition)
            .unwrap_or(Condition::Unknown)
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Condition::Rain => "🌧️",
            Condition::Snow => "❄️",
            Condition::Cloudy => "☁️",
            Condition::Fog => "🌫️",
            Condition::Storm => "⛈️",
            Condition::Clear => "☀️",
            Condition::PartlyCloudy => "🌤️",
            Condition::Scattered => "⛅",
            Condition::Unknown => "🌡️",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconPolicy {
    /// Description keywords when a description is present, temperature otherwise.
    #[default]
    Auto,
    Temperature,
}

impl IconPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            IconPolicy::Auto => "auto",
            IconPolicy::Temperature => "temperature",
        }
    }
}

impl std::fmt::Display for IconPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for IconPolicy {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "auto" => Ok(IconPolicy::Auto),
            "temperature" => Ok(IconPolicy::Temperature),
            _ => Err(anyhow::anyhow!(
                "Unknown icon policy '{value}'. Supported policies: auto, temperature."
            )),
        }
    }
}

pub fn weather_icon(payload: &WeatherPayload, policy: IconPolicy) -> &'static str {
    let description = payload
        .weather
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty());

    match (policy, description) {
        (IconPolicy::Auto, Some(d)) => Condition::from_description(d).glyph(),
        _ => Band::from_celsius(payload.weather.temperature).glyph(),
    }
}

/// Theme class, always by temperature band regardless of icon policy.
pub fn theme_class(payload: &WeatherPayload) -> &'static str {
    Band::from_celsius(payload.weather.temperature).css_class()
}

/// Suggestions ready for display.
#[derive(Debug, Clone, PartialEq)]
pub enum Suggestions {
    /// Backend-supplied markup, passed through untouched.
    Markup(String),
    /// One entry per non-blank line, trimmed, in original order.
    Items(Vec<String>),
}

pub fn format_suggestions(raw: &str) -> Suggestions {
    if raw.contains('<') {
        return Suggestions::Markup(raw.to_string());
    }

    Suggestions::Items(
        raw.split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// How markup suggestions reach the terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupPolicy {
    /// Print backend markup verbatim. Assumes a first-party backend.
    #[default]
    Trusted,
    /// Reduce markup to plain list items through an allow-list of tags.
    Plain,
}

impl MarkupPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkupPolicy::Trusted => "trusted",
            MarkupPolicy::Plain => "plain",
        }
    }
}

impl std::fmt::Display for MarkupPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for MarkupPolicy {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "trusted" => Ok(MarkupPolicy::Trusted),
            "plain" => Ok(MarkupPolicy::Plain),
            _ => Err(anyhow::anyhow!(
                "Unknown markup policy '{value}'. Supported policies: trusted, plain."
            )),
        }
    }
}

static BREAK_TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\s*(?:br|/?li|/?p|/?ul|/?ol|/?div)\b[^>]*>").expect("valid regex")
});
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// Plain-text lines from markup: list items, paragraphs and line breaks
/// become separate lines, every other tag is dropped.
pub fn markup_to_lines(markup: &str) -> Vec<String> {
    let broken = BREAK_TAGS.replace_all(markup, "\n");
    let stripped = ANY_TAG.replace_all(&broken, "");

    stripped
        .split('\n')
        .map(|line| decode_entities(line.trim()))
        .filter(|line| !line.is_empty())
        .collect()
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Place name: the weather city first, then the location city.
pub fn location_label(payload: &WeatherPayload) -> Option<&str> {
    non_empty(&payload.weather.city)
        .or_else(|| payload.location.as_ref().and_then(|l| non_empty(&l.city)))
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

pub fn coordinates_label(lat: f64, lon: f64) -> String {
    format!("{lat:.4}, {lon:.4}")
}

/// All display attributes for one ready payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub label: Option<String>,
    pub coordinates: Option<String>,
    pub icon: &'static str,
    pub theme: &'static str,
    pub temperature: String,
    pub humidity: String,
    pub description: Option<String>,
    pub suggestions: Option<Suggestions>,
}

impl Card {
    pub fn new(payload: &WeatherPayload, icons: IconPolicy) -> Self {
        Self {
            label: location_label(payload).map(str::to_string),
            coordinates: payload.location.as_ref().map(|l| coordinates_label(l.lat, l.lon)),
            icon: weather_icon(payload, icons),
            theme: theme_class(payload),
            temperature: format!("{}°C", payload.weather.temperature),
            humidity: format!("{}%", payload.weather.humidity),
            description: payload
                .weather
                .description
                .clone()
                .filter(|d| !d.trim().is_empty()),
            suggestions: payload
                .suggestions
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(format_suggestions),
        }
    }
}
