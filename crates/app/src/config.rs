//! Runtime configuration loaded from the environment.
//!
//! A `.env` file in the working directory is honoured for local runs.

use std::env;

use services::GenerationConfig;
use tracing::Level;

pub const DEFAULT_DB_URL: &str = "sqlite:courses.sqlite3?mode=rwc";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_url: String,
    pub log_level: Level,
    pub generator: Option<GenerationConfig>,
}

impl AppConfig {
    /// Reads `COURSE_DB_URL`, `COURSE_LOG_LEVEL` and the generator settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an unparseable log level.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_url = lookup("COURSE_DB_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_URL.to_string());

        let log_level = match lookup("COURSE_LOG_LEVEL") {
            Some(raw) => raw.trim().parse::<Level>().map_err(|_| {
                ConfigError::InvalidValue("COURSE_LOG_LEVEL".to_string(), raw.clone())
            })?,
            None => Level::INFO,
        };

        let generator = lookup("COURSE_GENERATOR_URL").and_then(|url| {
            let api_key = lookup("COURSE_GENERATOR_API_KEY").filter(|k| !k.trim().is_empty());
            GenerationConfig::new(&url, api_key)
        });

        Ok(Self {
            db_url,
            log_level,
            generator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_without_env() {
        let config = load(&[]).unwrap();
        assert_eq!(config.db_url, DEFAULT_DB_URL);
        assert_eq!(config.log_level, Level::INFO);
        assert!(config.generator.is_none());
    }

    #[test]
    fn reads_generator_settings() {
        let config = load(&[
            ("COURSE_DB_URL", "sqlite::memory:"),
            ("COURSE_LOG_LEVEL", "debug"),
            ("COURSE_GENERATOR_URL", "http://localhost:3000/api/generate"),
            ("COURSE_GENERATOR_API_KEY", "secret"),
        ])
        .unwrap();
        assert_eq!(config.db_url, "sqlite::memory:");
        assert_eq!(config.log_level, Level::DEBUG);
        let generator = config.generator.unwrap();
        assert_eq!(generator.endpoint.as_str(), "http://localhost:3000/api/generate");
        assert_eq!(generator.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn rejects_unknown_log_level() {
        assert!(matches!(
            load(&[("COURSE_LOG_LEVEL", "loud")]),
            Err(ConfigError::InvalidValue(var, _)) if var == "COURSE_LOG_LEVEL"
        ));
    }
}
