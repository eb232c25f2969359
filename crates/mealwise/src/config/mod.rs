use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::planner::MAX_SEARCH_RADIUS_KM;

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

    pub fn label(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub discounts: DiscountConfig,
    pub assistant: AssistantConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .or_else(|_| env::var("PORT"))
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            discounts: DiscountConfig::from_env()?,
            assistant: AssistantConfig::from_env()?,
        })
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where discount records come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountSourceKind {
    Mock,
    Salling,
}

impl DiscountSourceKind {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mock" | "" => Ok(Self::Mock),
            "salling" | "api" => Ok(Self::Salling),
            other => Err(ConfigError::UnknownDiscountSource(other.to_string())),
        }
    }
}

/// Retailer API and cache settings.
#[derive(Debug, Clone)]
pub struct DiscountConfig {
    pub source: DiscountSourceKind,
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
    pub search_radius_km: f64,
}

impl DiscountConfig {
    pub const DEFAULT_API_URL: &'static str = "https://api.sallinggroup.com";
    pub const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

    fn from_env() -> Result<Self, ConfigError> {
        let source = DiscountSourceKind::parse(
            &env::var("DISCOUNT_SOURCE").unwrap_or_else(|_| "mock".to_string()),
        )?;
        let api_key = non_empty_var("DISCOUNT_API_KEY");
        if source == DiscountSourceKind::Salling && api_key.is_none() {
            return Err(ConfigError::MissingVar("DISCOUNT_API_KEY"));
        }

        let search_radius_km = parse_var("DISCOUNT_SEARCH_RADIUS_KM", 5.0_f64)?;
        if !(search_radius_km > 0.0 && search_radius_km <= MAX_SEARCH_RADIUS_KM) {
            return Err(ConfigError::InvalidNumber {
                name: "DISCOUNT_SEARCH_RADIUS_KM",
                value: search_radius_km.to_string(),
            });
        }

        Ok(Self {
            source,
            api_base_url: env::var("DISCOUNT_API_URL")
                .unwrap_or_else(|_| Self::DEFAULT_API_URL.to_string()),
            api_key,
            cache_ttl: Duration::from_secs(parse_var(
                "DISCOUNT_CACHE_TTL_SECS",
                Self::DEFAULT_CACHE_TTL_SECS,
            )?),
            request_timeout: timeout_var("DISCOUNT_TIMEOUT_SECS", 10)?,
            search_radius_km,
        })
    }
}

impl Default for DiscountConfig {
    fn default() -> Self {
        Self {
            source: DiscountSourceKind::Mock,
            api_base_url: Self::DEFAULT_API_URL.to_string(),
            api_key: None,
            cache_ttl: Duration::from_secs(Self::DEFAULT_CACHE_TTL_SECS),
            request_timeout: Duration::from_secs(10),
            search_radius_km: 5.0,
        }
    }
}

/// Generative model settings. Without an API key the planner only uses
/// rule-based meal suggestions.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub model: String,
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub request_timeout: Duration,
}

impl AssistantConfig {
    pub const DEFAULT_MODEL: &'static str = "gemini-2.0-flash";
    pub const DEFAULT_API_URL: &'static str = "https://generativelanguage.googleapis.com";

    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            model: env::var("ASSISTANT_MODEL").unwrap_or_else(|_| Self::DEFAULT_MODEL.to_string()),
            api_base_url: env::var("ASSISTANT_API_URL")
                .unwrap_or_else(|_| Self::DEFAULT_API_URL.to_string()),
            api_key: non_empty_var("ASSISTANT_API_KEY"),
            request_timeout: timeout_var("ASSISTANT_TIMEOUT_SECS", 30)?,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: Self::DEFAULT_MODEL.to_string(),
            api_base_url: Self::DEFAULT_API_URL.to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { name, value: raw }),
        Err(_) => Ok(default),
    }
}

fn timeout_var(name: &'static str, default_secs: u64) -> Result<Duration, ConfigError> {
    match parse_var(name, default_secs)? {
        0 => Err(ConfigError::InvalidNumber {
            name,
            value: "0".to_string(),
        }),
        secs => Ok(Duration::from_secs(secs)),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { name: &'static str, value: String },
    UnknownDiscountSource(String),
    MissingVar(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { name, value } => {
                write!(f, "{name} is out of range or not a number (got '{value}')")
            }
            ConfigError::UnknownDiscountSource(value) => {
                write!(f, "DISCOUNT_SOURCE must be 'mock' or 'salling' (got '{value}')")
            }
            ConfigError::MissingVar(name) => write!(f, "{name} must be set"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::UnknownDiscountSource(_)
            | ConfigError::MissingVar(_) => None,
        }
    }
}
