use config::{Config, ConfigError, Environment, File};
use doubles_helpers::USER_ENDPOINT;
use serde::{Deserialize, Serialize};
use tracing::Level;

/// Default bounds handed to `random_between`
const DEFAULT_RANDOM_MIN: i64 = 3;
const DEFAULT_RANDOM_MAX: i64 = 5;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DemoConfig {
    /// Url returning a todo with a `userId`
    /// Defaults to [`USER_ENDPOINT`]
    #[serde(default = "default_user_endpoint")]
    pub user_endpoint: String,

    #[serde(default = "default_random_min")]
    pub random_min: i64,

    #[serde(default = "default_random_max")]
    pub random_max: i64,

    /// One of trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl DemoConfig {
    /// Load configuration from multiple sources in order of priority:
    /// 1. Configuration file (doubles.toml, doubles.yaml, doubles.json)
    /// 2. Environment variables (prefixed with DOUBLES_)
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("doubles").required(false))
            .add_source(Environment::with_prefix("DOUBLES").try_parsing(true))
            .build()?;

        Self::from_config(config)
    }

    fn from_config(config: Config) -> Result<Self, ConfigError> {
        let demo_config: Self = config.try_deserialize()?;

        demo_config.validate()?;

        Ok(demo_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.user_endpoint.starts_with("http://") || self.user_endpoint.starts_with("https://"))
        {
            return Err(ConfigError::Message(format!(
                "user_endpoint must be an http(s) url, got {:?}",
                self.user_endpoint
            )));
        }

        if self.random_min > self.random_max {
            return Err(ConfigError::Message(format!(
                "random_min ({}) must not exceed random_max ({})",
                self.random_min, self.random_max
            )));
        }

        self.max_level()?;

        Ok(())
    }

    pub fn max_level(&self) -> Result<Level, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::Message(format!("Unknown log_level {:?}", self.log_level)))
    }
}

// Default values for serde defaults
fn default_user_endpoint() -> String {
    USER_ENDPOINT.to_string()
}

fn default_random_min() -> i64 {
    DEFAULT_RANDOM_MIN
}

fn default_random_max() -> i64 {
    DEFAULT_RANDOM_MAX
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn load_from_str(toml: &str) -> Result<DemoConfig, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        DemoConfig::from_config(config)
    }

    #[test]
    fn test_defaults() {
        let config = load_from_str("").unwrap();

        assert_eq!(config.user_endpoint, USER_ENDPOINT);
        assert_eq!(config.random_min, 3);
        assert_eq!(config.random_max, 5);
        assert_eq!(config.max_level().unwrap(), Level::INFO);
    }

    #[test]
    fn test_overrides() {
        let config = load_from_str(
            r#"
            user_endpoint = "http://localhost:8080/todos/1"
            random_min = 10
            random_max = 20
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.user_endpoint, "http://localhost:8080/todos/1");
        assert_eq!(config.random_min, 10);
        assert_eq!(config.random_max, 20);
        assert_eq!(config.max_level().unwrap(), Level::DEBUG);
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        let err = load_from_str(r#"user_endpoint = "ftp://example.com""#).unwrap_err();
        assert!(err.to_string().contains("user_endpoint"));

        assert!(load_from_str(r#"user_endpoint = """#).is_err());
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let err = load_from_str("random_min = 6\nrandom_max = 5").unwrap_err();
        assert!(err.to_string().contains("random_min"));
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        assert!(load_from_str(r#"log_level = "loud""#).is_err());
    }
}
