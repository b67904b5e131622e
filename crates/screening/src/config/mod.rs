use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

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

/// Top-level configuration, loaded once at startup and passed into constructors.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub survey: SurveyConfig,
    pub storage: StorageConfig,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&var_or("APP_ENV", "development"));

        let host = var_or("APP_HOST", "127.0.0.1");
        let port = var_or("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = var_or("APP_LOG_LEVEL", "info");

        let survey = SurveyConfig {
            question_root: PathBuf::from(var_or("APP_SURVEY_ROOT", "assets")),
            frontend_dir: PathBuf::from(var_or("APP_FRONTEND_DIR", "frontend/build")),
            messages_path: optional_var("APP_MESSAGES_PATH").map(PathBuf::from),
        };

        let timeout_ms = var_or("APP_RESULT_TIMEOUT_MS", "5000")
            .parse::<u64>()
            .ok()
            .filter(|ms| *ms > 0)
            .ok_or(ConfigError::InvalidSinkTimeout)?;

        let sink = match var_or("APP_RESULT_SINK", "directory")
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "directory" | "dir" | "file" => SinkConfig::Directory {
                root: PathBuf::from(var_or("APP_RESULT_DIR", "results")),
            },
            "http" | "object-store" => SinkConfig::Http {
                endpoint: optional_var("APP_RESULT_ENDPOINT")
                    .ok_or(ConfigError::MissingSetting("APP_RESULT_ENDPOINT"))?,
                bucket: optional_var("APP_RESULT_BUCKET")
                    .ok_or(ConfigError::MissingSetting("APP_RESULT_BUCKET"))?,
                token: optional_var("APP_RESULT_TOKEN"),
            },
            "disabled" | "none" | "off" => SinkConfig::Disabled,
            other => return Err(ConfigError::InvalidSinkKind(other.to_string())),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                with_target: environment != AppEnvironment::Production,
            },
            survey,
            storage: StorageConfig {
                sink,
                timeout: Duration::from_millis(timeout_ms),
            },
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub with_target: bool,
}

/// Locations of question sets, the bundled front-end, and template overrides.
#[derive(Debug, Clone)]
pub struct SurveyConfig {
    pub question_root: PathBuf,
    pub frontend_dir: PathBuf,
    pub messages_path: Option<PathBuf>,
}

/// Where evaluation records go and how long a write may take.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub sink: SinkConfig,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkConfig {
    Directory {
        root: PathBuf,
    },
    Http {
        endpoint: String,
        bucket: String,
        token: Option<String>,
    },
    Disabled,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSinkKind(String),
    InvalidSinkTimeout,
    MissingSetting(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSinkKind(kind) => write!(
                f,
                "APP_RESULT_SINK must be one of directory, http, disabled (got '{kind}')"
            ),
            ConfigError::InvalidSinkTimeout => {
                write!(f, "APP_RESULT_TIMEOUT_MS must be a positive number of milliseconds")
            }
            ConfigError::MissingSetting(key) => {
                write!(f, "{key} is required for the configured result sink")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidSinkKind(_)
            | ConfigError::InvalidSinkTimeout
            | ConfigError::MissingSetting(_) => None,
        }
    }
}
