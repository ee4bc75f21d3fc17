use crate::core::import::ImportPolicy;
use crate::core::pager::DEFAULT_ITEMS_PER_PAGE;
use crate::utils::error::{DefineryError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub paging: PagingConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub base_url: String,
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagingConfig {
    pub items_per_page: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default)]
    pub policy: ImportPolicy,
}

impl ClientConfig {
    /// Loads and parses a TOML config file, substituting `${VAR}` placeholders.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DefineryError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DefineryError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    pub fn items_per_page(&self) -> usize {
        self.paging.items_per_page
    }

    pub fn import_policy(&self) -> ImportPolicy {
        self.import.policy
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        validate_url("server.base_url", &self.server.base_url)?;
        validate_non_empty_string("server.username", &self.server.username)?;
        if self.server.password.starts_with("${") {
            return Err(DefineryError::MissingConfigError {
                field: format!("server.password (environment variable {})", self.server.password),
            });
        }
        if let Some(timeout) = self.server.timeout_seconds {
            validate_range("server.timeout_seconds", timeout, 1, 600)?;
        }
        validate_positive_number("paging.items_per_page", self.paging.items_per_page, 1)?;
        Ok(())
    }
}
