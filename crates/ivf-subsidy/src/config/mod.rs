use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::subsidy::SchemeCutover;

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

/// Top-level configuration for the calculator.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub history: HistoryConfig,
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

        let history_path = env::var("APP_HISTORY_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("ivf_history.json"));
        let capacity = match env::var("APP_HISTORY_CAPACITY") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|capacity| *capacity > 0)
                .ok_or(ConfigError::InvalidHistoryCapacity { value: raw })?,
            Err(_) => DEFAULT_HISTORY_CAPACITY,
        };

        let cutover = match env::var("SUBSIDY_CURRENT_SCHEME_START") {
            Ok(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map(SchemeCutover::new)
                .map_err(|source| ConfigError::InvalidSchemeStart { value: raw, source })?,
            Err(_) => SchemeCutover::default(),
        };
        let schedule_path = env::var("SUBSIDY_SCHEDULE_PATH")
            .ok()
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            history: HistoryConfig {
                path: history_path,
                capacity,
            },
            rules: RulesConfig {
                cutover,
                schedule_path,
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
}

/// Location and retention of the calculation log.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    pub path: PathBuf,
    pub capacity: usize,
}

/// Scheme cutover and optional amount-table override.
#[derive(Debug, Clone)]
pub struct RulesConfig {
    pub cutover: SchemeCutover,
    pub schedule_path: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidHistoryCapacity {
        value: String,
    },
    InvalidSchemeStart {
        value: String,
        source: chrono::ParseError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidHistoryCapacity { value } => write!(
                f,
                "APP_HISTORY_CAPACITY must be a positive integer (found '{}')",
                value
            ),
            ConfigError::InvalidSchemeStart { value, .. } => write!(
                f,
                "SUBSIDY_CURRENT_SCHEME_START must be YYYY-MM-DD (found '{}')",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidHistoryCapacity { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidSchemeStart { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_HISTORY_PATH");
        env::remove_var("APP_HISTORY_CAPACITY");
        env::remove_var("SUBSIDY_CURRENT_SCHEME_START");
        env::remove_var("SUBSIDY_SCHEDULE_PATH");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.history.path, PathBuf::from("ivf_history.json"));
        assert_eq!(config.history.capacity, 10);
        assert_eq!(
            config.rules.cutover.current_from,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
        assert!(config.rules.schedule_path.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_history_and_rule_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HISTORY_PATH", "/var/lib/ivf/history.json");
        env::set_var("APP_HISTORY_CAPACITY", "25");
        env::set_var("SUBSIDY_CURRENT_SCHEME_START", "2024-07-01");
        env::set_var("SUBSIDY_SCHEDULE_PATH", "rules/schedule.json");

        let config = AppConfig::load().expect("config loads");

        assert_eq!(config.history.path, PathBuf::from("/var/lib/ivf/history.json"));
        assert_eq!(config.history.capacity, 25);
        assert_eq!(
            config.rules.cutover.current_from,
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
        );
        assert_eq!(
            config.rules.schedule_path,
            Some(PathBuf::from("rules/schedule.json"))
        );
        reset_env();
    }

    #[test]
    fn rejects_zero_history_capacity() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HISTORY_CAPACITY", "0");

        let err = AppConfig::load().expect_err("zero capacity rejected");

        assert!(matches!(err, ConfigError::InvalidHistoryCapacity { .. }));
        reset_env();
    }

    #[test]
    fn rejects_malformed_scheme_start() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SUBSIDY_CURRENT_SCHEME_START", "01/01/2025");

        let err = AppConfig::load().expect_err("bad date rejected");

        assert!(err.to_string().contains("SUBSIDY_CURRENT_SCHEME_START"));
        reset_env();
    }
}
