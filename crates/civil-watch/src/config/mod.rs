use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::geo::{Coordinate, Location};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub situation: SituationConfig,
    pub feeds: FeedConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = SituationConfig::default();
        let situation = SituationConfig {
            default_latitude: number_var("DEFAULT_LATITUDE", defaults.default_latitude)?,
            default_longitude: number_var("DEFAULT_LONGITUDE", defaults.default_longitude)?,
            shelter_search_radius_km: number_var(
                "SHELTER_SEARCH_RADIUS_KM",
                defaults.shelter_search_radius_km,
            )?,
            hazard_search_radius_km: number_var(
                "HAZARD_SEARCH_RADIUS_KM",
                defaults.hazard_search_radius_km,
            )?,
            notification_check_interval_secs: number_var(
                "NOTIFICATION_CHECK_INTERVAL_SECS",
                defaults.notification_check_interval_secs,
            )?,
            overview_shelter_limit: number_var(
                "OVERVIEW_SHELTER_LIMIT",
                defaults.overview_shelter_limit,
            )?,
        };
        situation.validate()?;

        let feeds = FeedConfig {
            data_dir: env::var("DATA_DIR")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
            hazard_refresh_secs: number_var("HAZARD_REFRESH_SECS", 3600)?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            situation,
            feeds,
        })
    }
}

fn number_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidNumber { name, value: raw })
        }
        _ => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Domain defaults shared by the engine and its pollers.
#[derive(Debug, Clone, PartialEq)]
pub struct SituationConfig {
    pub default_latitude: f64,
    pub default_longitude: f64,
    pub shelter_search_radius_km: f64,
    pub hazard_search_radius_km: f64,
    /// Only meaningful to clients polling the notification feed.
    pub notification_check_interval_secs: u64,
    pub overview_shelter_limit: usize,
}

impl Default for SituationConfig {
    fn default() -> Self {
        Self {
            default_latitude: 55.7558,
            default_longitude: 37.6173,
            shelter_search_radius_km: 10.0,
            hazard_search_radius_km: 50.0,
            notification_check_interval_secs: 300,
            overview_shelter_limit: 5,
        }
    }
}

impl SituationConfig {
    pub fn default_coordinate(&self) -> Coordinate {
        Coordinate::new(self.default_latitude, self.default_longitude)
    }

    pub fn default_location(&self) -> Location {
        Location::at(self.default_coordinate())
    }

    pub fn notification_check_interval(&self) -> Duration {
        Duration::from_secs(self.notification_check_interval_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_coordinate().is_valid() {
            return Err(ConfigError::InvalidCoordinate {
                latitude: self.default_latitude,
                longitude: self.default_longitude,
            });
        }
        Ok(())
    }
}

/// Where hazard and shelter data come from, and how often hazards are re-pulled.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Directory holding CSV snapshots; built-in fixtures when absent.
    pub data_dir: Option<PathBuf>,
    pub hazard_refresh_secs: u64,
}

impl FeedConfig {
    pub fn hazard_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.hazard_refresh_secs.max(1))
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { name: &'static str, value: String },
    InvalidCoordinate { latitude: f64, longitude: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { name, value } => {
                write!(f, "{name} must be numeric (got '{value}')")
            }
            ConfigError::InvalidCoordinate {
                latitude,
                longitude,
            } => write!(
                f,
                "default location {latitude}, {longitude} is outside valid latitude/longitude ranges"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidCoordinate { .. } => None,
        }
    }
}
