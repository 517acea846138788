use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::workflows::move_out::JurisdictionPolicy;

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
    pub jurisdiction: JurisdictionPolicy,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            jurisdiction: load_jurisdiction()?,
        })
    }
}

fn load_jurisdiction() -> Result<JurisdictionPolicy, ConfigError> {
    let mut policy = match env::var("DEPOSIT_JURISDICTION") {
        Ok(name) => preset(&name).ok_or(ConfigError::UnknownJurisdiction(name))?,
        Err(_) => JurisdictionPolicy::minnesota(),
    };

    if let Some(days) = parse_var::<u32>("DEPOSIT_RETURN_DEADLINE_DAYS")? {
        if days == 0 {
            return Err(ConfigError::InvalidPolicy {
                variable: "DEPOSIT_RETURN_DEADLINE_DAYS",
            });
        }
        policy.return_deadline_days = days;
    }
    if let Some(rate) = parse_var::<Decimal>("DEPOSIT_DEFAULT_INTEREST_RATE")? {
        if rate.is_sign_negative() {
            return Err(ConfigError::InvalidPolicy {
                variable: "DEPOSIT_DEFAULT_INTEREST_RATE",
            });
        }
        policy.default_interest_rate = rate;
    }
    if let Some(days) = parse_var::<u32>("DEPOSIT_DUE_SOON_DAYS")? {
        policy.due_soon_days = days;
    }

    Ok(policy)
}

fn preset(name: &str) -> Option<JurisdictionPolicy> {
    match name.trim().to_ascii_lowercase().as_str() {
        "mn" | "minnesota" => Some(JurisdictionPolicy::minnesota()),
        _ => None,
    }
}

fn parse_var<T: FromStr>(variable: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(variable) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidPolicy { variable }),
        Err(_) => Ok(None),
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

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    UnknownJurisdiction(String),
    InvalidPolicy { variable: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::UnknownJurisdiction(name) => {
                write!(f, "DEPOSIT_JURISDICTION '{name}' has no deposit-return preset")
            }
            ConfigError::InvalidPolicy { variable } => {
                write!(f, "{variable} is out of range or not a number")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::UnknownJurisdiction(_)
            | ConfigError::InvalidPolicy { .. } => None,
        }
    }
}

/// Serializes tests that mutate process environment variables.
#[cfg(test)]
pub(crate) fn env_guard() -> &'static std::sync::Mutex<()> {
    static GUARD: std::sync::OnceLock<std::sync::Mutex<()>> = std::sync::OnceLock::new();
    GUARD.get_or_init(|| std::sync::Mutex::new(()))
}
