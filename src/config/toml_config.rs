use crate::core::filter::ExperienceMode;
use crate::core::presenter::ReconcileStrategy;
use crate::core::session::{AfterSubmit, SessionSettings};
use crate::domain::model::{Coordinate, Viewport};
use crate::utils::error::{PinMapError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{validate_positive_number, validate_range, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub map: MapConfig,
    pub filter: FilterConfig,
    pub submission: SubmissionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub center: Coordinate,
    pub zoom: u8,
    pub locate_zoom: u8,
    pub strategy: ReconcileStrategy,
    /// Re-apply the radius field against the viewport center after each move.
    pub live_radius: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        let viewport = Viewport::default();
        Self {
            center: viewport.center,
            zoom: viewport.zoom,
            locate_zoom: 12,
            strategy: ReconcileStrategy::default(),
            live_radius: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub nearby_radius_km: f64,
    pub experience: ExperienceMode,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            nearby_radius_km: 100.0,
            experience: ExperienceMode::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    pub after_submit: AfterSubmit,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PinMapError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| PinMapError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_seconds)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            strategy: self.map.strategy,
            viewport: Viewport {
                center: self.map.center,
                zoom: self.map.zoom,
            },
            locate_zoom: self.map.locate_zoom,
            live_radius: self.map.live_radius,
            nearby_radius_km: self.filter.nearby_radius_km,
            experience_mode: self.filter.experience,
            after_submit: self.submission.after_submit,
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_url("server.base_url", &self.server.base_url)?;
        validate_positive_number("server.timeout_seconds", self.server.timeout_seconds, 1)?;
        validate_range("map.center.lat", self.map.center.lat, -90.0, 90.0)?;
        validate_range("map.center.lon", self.map.center.lon, -180.0, 180.0)?;

        let radius = self.filter.nearby_radius_km;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(PinMapError::InvalidConfigValueError {
                field: "filter.nearby_radius_km".to_string(),
                value: radius.to_string(),
                reason: "Radius must be a positive number of kilometres".to_string(),
            });
        }

        Ok(())
    }
}
