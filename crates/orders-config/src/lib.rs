//! Configuration module for the order desk.
//!
//! This module provides structures and utilities for managing front-end
//! configuration. It supports loading configuration from TOML files,
//! resolves `${VAR}` and `${VAR:-default}` references against the
//! environment, and validates the result before handing it out.
//!
//! A missing configuration file is not an error: [`Config::default`] points at
//! a backend on `http://localhost:8000` using the HTTP implementation.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable that overrides the backend base URL.
pub const BASE_URL_ENV: &str = "ORDERS_API_URL";

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the order desk.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
	/// Backend connection settings.
	#[serde(default)]
	pub api: ApiConfig,
	/// Front-end behaviour settings.
	#[serde(default)]
	pub ui: UiConfig,
}

/// Configuration for the backend connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Base URL of the orders REST service.
	#[serde(default = "default_base_url")]
	pub base_url: String,
	/// Which order API implementation to use ("http" or "memory").
	#[serde(default = "default_implementation")]
	pub implementation: String,
	/// Request timeout in seconds. Requests never time out when unset.
	#[serde(default)]
	pub timeout_seconds: Option<u64>,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			base_url: default_base_url(),
			implementation: default_implementation(),
			timeout_seconds: None,
		}
	}
}

/// Configuration for interactive behaviour.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiConfig {
	/// Whether deletes ask for confirmation before issuing the request.
	#[serde(default = "default_confirm_deletes")]
	pub confirm_deletes: bool,
}

impl Default for UiConfig {
	fn default() -> Self {
		Self {
			confirm_deletes: default_confirm_deletes(),
		}
	}
}

fn default_base_url() -> String {
	DEFAULT_BASE_URL.to_string()
}

fn default_implementation() -> String {
	"http".to_string()
}

fn default_confirm_deletes() -> bool {
	true
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)));
				},
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, resolving environment variables.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot read {}: {}", path.display(), e),
			))
		})?;
		let config: Config = content.parse()?;
		tracing::debug!("Loaded configuration from {}", path.display());
		Ok(config)
	}

	/// Loads configuration from `path` if it exists, otherwise returns defaults.
	pub async fn from_file_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		if tokio::fs::try_exists(path).await? {
			Self::from_file(path).await
		} else {
			tracing::debug!(
				"No configuration at {}, using defaults",
				path.display()
			);
			Ok(Self::default())
		}
	}

	/// Replaces the base URL, trimmed, and validates the result.
	pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self, ConfigError> {
		let base_url: String = base_url.into();
		self.api.base_url = base_url.trim().to_string();
		self.validate()?;
		Ok(self)
	}

	/// Replaces the API implementation name and validates the result.
	pub fn with_implementation(
		mut self,
		implementation: impl Into<String>,
	) -> Result<Self, ConfigError> {
		self.api.implementation = implementation.into();
		self.validate()?;
		Ok(self)
	}

	/// Validates the configuration to ensure all required fields are properly set.
	///
	/// - The base URL must be an absolute http(s) URL
	/// - An implementation name must be given
	/// - A timeout, when set, must be between 1 and 3600 seconds
	fn validate(&self) -> Result<(), ConfigError> {
		let base_url = self.api.base_url.as_str();
		if base_url.is_empty() {
			return Err(ConfigError::Validation(
				"API base_url cannot be empty".into(),
			));
		}
		if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
			return Err(ConfigError::Validation(format!(
				"API base_url must start with http:// or https://, got '{}'",
				base_url
			)));
		}

		if self.api.implementation.is_empty() {
			return Err(ConfigError::Validation(
				"API implementation cannot be empty".into(),
			));
		}

		if let Some(timeout) = self.api.timeout_seconds {
			if timeout == 0 {
				return Err(ConfigError::Validation(
					"API timeout_seconds must be greater than 0".into(),
				));
			}
			if timeout > 3600 {
				return Err(ConfigError::Validation(
					"API timeout_seconds cannot exceed 3600 (1 hour)".into(),
				));
			}
		}

		Ok(())
	}
}

/// Parses configuration from a TOML string.
///
/// Environment variables are resolved and the configuration is validated
/// after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let mut config: Config = toml::from_str(&resolved)?;
		config.api.base_url = config.api.base_url.trim().to_string();
		config.validate()?;
		Ok(config)
	}
}
