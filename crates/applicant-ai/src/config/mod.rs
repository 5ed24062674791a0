use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::workflows::applicants::{Currency, GenerationConfig, ShortlistConfig};

const DEFAULT_TIER_1_COMPANIES: &str = "Google,Meta,OpenAI,Microsoft,Apple,Amazon,Netflix";
const DEFAULT_ELIGIBLE_LOCATIONS: &str = "US,Canada,UK,Germany,India";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

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
    pub shortlist: ShortlistConfig,
    pub generation: GenerationConfig,
    pub openai: OpenAiConfig,
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

        let raw_currency = env_or("RATE_CURRENCY", "USD");
        let rate_currency =
            Currency::parse(&raw_currency).ok_or(ConfigError::UnknownCurrency {
                variable: "RATE_CURRENCY",
                found: raw_currency,
            })?;

        let shortlist = ShortlistConfig {
            tier_one_companies: parse_list("TIER_1_COMPANIES", DEFAULT_TIER_1_COMPANIES),
            eligible_locations: parse_list("ELIGIBLE_LOCATIONS", DEFAULT_ELIGIBLE_LOCATIONS),
            max_hourly_rate: parse_env("MAX_HOURLY_RATE", "100")?,
            rate_currency,
            min_availability_hours: parse_env("MIN_AVAILABILITY_HOURS", "20")?,
            min_experience_years: parse_env("MIN_EXPERIENCE_YEARS", "4")?,
        };

        let generation = GenerationConfig {
            model: env_or("LLM_MODEL", "gpt-4"),
            max_tokens: parse_env("MAX_TOKENS", "500")?,
            temperature: parse_env("TEMPERATURE", "0.3")?,
            max_attempts: parse_env("LLM_MAX_ATTEMPTS", "3")?,
            backoff_base: Duration::from_millis(parse_env("LLM_BACKOFF_BASE_MS", "1000")?),
        };

        let openai = OpenAiConfig {
            base_url: env_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            api_key: env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            shortlist,
            generation,
            openai,
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

/// Credentials and endpoint for the hosted generation service.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

fn env_or(name: &str, fallback: &str) -> String {
    env::var(name).unwrap_or_else(|_| fallback.to_string())
}

fn parse_env<T: std::str::FromStr>(
    name: &'static str,
    fallback: &str,
) -> Result<T, ConfigError> {
    env_or(name, fallback)
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidNumber { variable: name })
}

fn parse_list(name: &str, fallback: &str) -> Vec<String> {
    env_or(name, fallback)
        .split(',')
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { variable: &'static str },
    UnknownCurrency { variable: &'static str, found: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { variable } => {
                write!(f, "{variable} must be a valid number")
            }
            ConfigError::UnknownCurrency { variable, found } => {
                write!(f, "{variable} must name a supported currency, found '{found}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
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
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "TIER_1_COMPANIES",
            "ELIGIBLE_LOCATIONS",
            "MAX_HOURLY_RATE",
            "RATE_CURRENCY",
            "MIN_AVAILABILITY_HOURS",
            "MIN_EXPERIENCE_YEARS",
            "LLM_MODEL",
            "MAX_TOKENS",
            "TEMPERATURE",
            "LLM_MAX_ATTEMPTS",
            "LLM_BACKOFF_BASE_MS",
            "OPENAI_API_KEY",
            "OPENAI_BASE_URL",
        ] {
            env::remove_var(name);
        }
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
        assert_eq!(config.shortlist.tier_one_companies.len(), 7);
        assert_eq!(config.shortlist.max_hourly_rate, 100.0);
        assert_eq!(config.shortlist.rate_currency, Currency::Usd);
        assert_eq!(config.shortlist.min_availability_hours, 20);
        assert_eq!(config.generation.model, "gpt-4");
        assert_eq!(config.generation.max_tokens, 500);
        assert_eq!(config.generation.max_attempts, 3);
        assert_eq!(config.generation.backoff_base, Duration::from_millis(1000));
        assert!(config.openai.api_key.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn list_overrides_are_trimmed() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("TIER_1_COMPANIES", " Stripe , Datadog ,, Figma ");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(
            config.shortlist.tier_one_companies,
            vec!["Stripe", "Datadog", "Figma"]
        );
    }

    #[test]
    fn rejects_unparseable_threshold() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MAX_HOURLY_RATE", "a-lot");
        let error = AppConfig::load().expect_err("rate must be numeric");
        assert!(matches!(
            error,
            ConfigError::InvalidNumber {
                variable: "MAX_HOURLY_RATE"
            }
        ));
    }

    #[test]
    fn rejects_unknown_rate_currency() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("RATE_CURRENCY", "DOGE");
        let error = AppConfig::load().expect_err("currency must be supported");
        assert!(matches!(
            error,
            ConfigError::UnknownCurrency {
                variable: "RATE_CURRENCY",
                ..
            }
        ));
    }
}
