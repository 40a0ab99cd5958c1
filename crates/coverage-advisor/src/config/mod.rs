use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::recommendations::AssemblyMode;

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

    /// Production repairs a broken recommendation; every other stage surfaces the defect.
    pub fn default_assembly_mode(self) -> AssemblyMode {
        match self {
            AppEnvironment::Production => AssemblyMode::FailSafe,
            AppEnvironment::Development | AppEnvironment::Test => AssemblyMode::Strict,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub engine: EngineConfig,
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

        let assembly_mode = match env::var("APP_ASSEMBLY_MODE") {
            Ok(raw) => parse_assembly_mode(&raw)?,
            Err(_) => environment.default_assembly_mode(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            engine: EngineConfig { assembly_mode },
        })
    }
}

fn parse_assembly_mode(raw: &str) -> Result<AssemblyMode, ConfigError> {
    match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "strict" => Ok(AssemblyMode::Strict),
        "fail_safe" | "failsafe" => Ok(AssemblyMode::FailSafe),
        _ => Err(ConfigError::InvalidAssemblyMode {
            value: raw.to_string(),
        }),
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

/// How the recommendation assembler reacts to an internal invariant breach.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub assembly_mode: AssemblyMode,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidAssemblyMode { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidAssemblyMode { value } => write!(
                f,
                "APP_ASSEMBLY_MODE must be 'strict' or 'fail_safe' (found '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidAssemblyMode { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
