use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::compliance::table::{
    TableDescriptor, DEFAULT_FILE_EXTENSION, DEFAULT_RULES_PATH, DEFAULT_SECTIONS,
};

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
    pub rules: RulesConfig,
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
            rules: RulesConfig::from_env()?,
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

/// Location of the rule table files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulesConfig {
    pub base_path: PathBuf,
    pub file_extension: String,
    pub sections: Vec<String>,
}

impl RulesConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_path =
            env::var("NCC_RULES_PATH").unwrap_or_else(|_| DEFAULT_RULES_PATH.to_string());
        let file_extension =
            env::var("NCC_RULES_EXTENSION").unwrap_or_else(|_| DEFAULT_FILE_EXTENSION.to_string());

        let sections = match env::var("NCC_RULES_SECTIONS") {
            Ok(raw) => {
                let sections: Vec<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|section| !section.is_empty())
                    .map(str::to_string)
                    .collect();
                if sections.is_empty() {
                    return Err(ConfigError::EmptySectionList);
                }
                sections
            }
            Err(_) => DEFAULT_SECTIONS.iter().map(|section| section.to_string()).collect(),
        };

        Ok(Self {
            base_path: PathBuf::from(base_path),
            file_extension,
            sections,
        })
    }

    pub fn descriptor(&self) -> TableDescriptor {
        TableDescriptor {
            base_path: self.base_path.clone(),
            file_extension: self.file_extension.clone(),
            sections: self.sections.clone(),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        let descriptor = TableDescriptor::default();
        Self {
            base_path: descriptor.base_path,
            file_extension: descriptor.file_extension,
            sections: descriptor.sections,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    EmptySectionList,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::EmptySectionList => {
                write!(f, "NCC_RULES_SECTIONS must name at least one section")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::EmptySectionList => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
