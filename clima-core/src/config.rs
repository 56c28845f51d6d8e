use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{location::GeolocationMode, presenter::IconPolicy, presenter::MarkupPolicy};

pub const ENV_WEATHER_URL: &str = "CLIMA_WEATHER_URL";
pub const ENV_CITY_URL: &str = "CLIMA_CITY_URL";
pub const ENV_GEOLOCATION: &str = "CLIMA_GEOLOCATION";

pub const DEFAULT_GEOLOCATION_URL: &str =
    "http://ip-api.com/json/?fields=status,message,lat,lon,city";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// weather_base_url = "http://localhost:8000"
/// city_base_url = "http://localhost:8000/city"
/// geolocation = "ip"
/// markup = "trusted"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base of the `/weather` and `/location` endpoints.
    pub weather_base_url: Option<String>,

    /// Base of the city-name endpoint; the encoded name is appended as a path segment.
    pub city_base_url: Option<String>,

    pub geolocation: GeolocationMode,

    /// IP lookup service used when `geolocation = "ip"`.
    pub geolocation_url: String,

    /// Ask before looking up the current location, like a browser permission prompt.
    pub ask_before_locating: bool,

    pub markup: MarkupPolicy,

    pub icon_policy: IconPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            weather_base_url: None,
            city_base_url: None,
            geolocation: GeolocationMode::default(),
            geolocation_url: DEFAULT_GEOLOCATION_URL.to_string(),
            ask_before_locating: true,
            markup: MarkupPolicy::default(),
            icon_policy: IconPolicy::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Load from disk, then apply `CLIMA_*` environment overrides.
    pub fn load_with_env() -> Result<Self> {
        let mut cfg = Self::load()?;
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Override fields from environment-style lookups. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_WEATHER_URL) {
            self.weather_base_url = Some(url);
        }
        if let Some(url) = get(ENV_CITY_URL) {
            self.city_base_url = Some(url);
        }
        if let Some(mode) = get(ENV_GEOLOCATION) {
            self.geolocation = GeolocationMode::try_from(mode.as_str())
                .with_context(|| format!("Invalid {ENV_GEOLOCATION} value"))?;
        }

        Ok(())
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "clima", "clima")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_leave_urls_unset() {
        let cfg = Config::default();

        assert!(cfg.weather_base_url.is_none());
        assert!(cfg.city_base_url.is_none());
        assert_eq!(cfg.geolocation, GeolocationMode::Ip);
        assert!(cfg.ask_before_locating);
        assert_eq!(cfg.markup, MarkupPolicy::Trusted);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = Config {
            weather_base_url: Some("http://file".into()),
            ..Config::default()
        };

        cfg.apply_env(env(&[
            (ENV_WEATHER_URL, "http://env"),
            (ENV_CITY_URL, "http://env/city"),
            (ENV_GEOLOCATION, "server"),
        ]))
        .expect("overrides should apply");

        assert_eq!(cfg.weather_base_url.as_deref(), Some("http://env"));
        assert_eq!(cfg.city_base_url.as_deref(), Some("http://env/city"));
        assert_eq!(cfg.geolocation, GeolocationMode::Server);
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut cfg = Config {
            weather_base_url: Some("http://file".into()),
            ..Config::default()
        };

        cfg.apply_env(env(&[(ENV_WEATHER_URL, "  ")])).expect("blank is fine");

        assert_eq!(cfg.weather_base_url.as_deref(), Some("http://file"));
    }

    #[test]
    fn unknown_geolocation_mode_errors() {
        let mut cfg = Config::default();
        let err = cfg.apply_env(env(&[(ENV_GEOLOCATION, "gps")])).unwrap_err();

        assert!(format!("{err:#}").contains("Unknown geolocation mode"));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            weather_base_url = "http://localhost:8000"
            geolocation = "off"
            markup = "plain"
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(cfg.weather_base_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(cfg.geolocation, GeolocationMode::Off);
        assert_eq!(cfg.markup, MarkupPolicy::Plain);
        assert_eq!(cfg.geolocation_url, DEFAULT_GEOLOCATION_URL);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config {
            weather_base_url: Some("http://localhost:8000".into()),
            city_base_url: Some("http://localhost:8000/city".into()),
            ask_before_locating: false,
            ..Config::default()
        };
        cfg.save_to(&path).expect("save should succeed");

        let loaded = Config::load_from(&path).expect("load should succeed");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).expect("missing file is not an error");
        assert_eq!(cfg, Config::default());
    }
}
