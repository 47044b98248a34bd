//! Configuration loading and persistence.

use super::{Config, API_TOKEN_ENV};
use crate::error::ConfigError;
use crate::secret::SecretString;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to a file path, atomically.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Resolve the transport API token from the environment.
    ///
    /// Credentials never live in the config file.
    pub fn api_token() -> Result<SecretString, ConfigError> {
        match std::env::var(API_TOKEN_ENV) {
            Ok(token) if !token.is_empty() => Ok(SecretString::new(token)),
            _ => Err(ConfigError::MissingEnv(API_TOKEN_ENV)),
        }
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.routes.is_empty() {
            errors.push("at least one route must be configured".to_string());
        }

        let mut seen = HashSet::new();
        for route in &self.routes {
            if !seen.insert((route.source_topic, route.target_topic)) {
                errors.push(format!(
                    "duplicate route: {} -> topic {}",
                    route
                        .source_topic
                        .map(|t| format!("topic {t}"))
                        .unwrap_or_else(|| "general".to_string()),
                    route.target_topic
                ));
            }

            // A route that mirrors a topic onto itself would loop.
            if self.source_space == self.target_space
                && route.source_topic == Some(route.target_topic)
            {
                errors.push(format!(
                    "route topic {} mirrors onto itself within space {}",
                    route.target_topic, self.source_space
                ));
            }
        }

        if self.delivery.send_timeout_secs == 0 {
            errors.push("delivery.send_timeout_secs cannot be 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors.join("; ")))
        }
    }
}
