// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered client configuration.
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. TOML file (`$XDG_CONFIG_HOME/logtracker/config.toml`, or an explicit path)
//! 3. Environment variables (`LOGTRACKER_*`)
//!
//! Callers such as the CLI apply their own overrides on top with
//! [`TrackerConfig::merge`].
//!
//! ```toml
//! url = "https://collector.example.com"
//! application_id = "app_123"
//! public_key = "pk_live_abc"
//! path_prefix = "/api"
//! request_timeout_secs = 10
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const ENV_URL: &str = "LOGTRACKER_URL";
pub const ENV_APPLICATION_ID: &str = "LOGTRACKER_APPLICATION_ID";
pub const ENV_PUBLIC_KEY: &str = "LOGTRACKER_PUBLIC_KEY";
pub const ENV_PATH_PREFIX: &str = "LOGTRACKER_PATH_PREFIX";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "LOGTRACKER_REQUEST_TIMEOUT_SECS";

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// I/O error reading config file
	#[error("failed to read {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// TOML parsing error
	#[error("TOML parse error in {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	/// Missing required field
	#[error("missing required field: {0}")]
	MissingField(&'static str),

	/// Invalid value
	#[error("invalid value for {field}: {message}")]
	InvalidValue { field: &'static str, message: String },
}

/// Client settings as read from files and the environment.
///
/// Every field is optional so partial sources can be merged. Use
/// [`TrackerConfig::validate`] once all sources are applied.
#[derive(Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
	/// Collector base URL, e.g. `https://collector.example.com`
	pub url: Option<String>,
	pub application_id: Option<String>,
	pub public_key: Option<String>,
	/// Path segment placed between the base URL and `/track/...`. Defaults to `/api`.
	pub path_prefix: Option<String>,
	/// HTTP request deadline. Unset leaves the transport default.
	pub request_timeout_secs: Option<u64>,
}

impl std::fmt::Debug for TrackerConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TrackerConfig")
			.field("url", &self.url)
			.field("application_id", &self.application_id)
			.field("public_key", &self.public_key.as_ref().map(|_| "[REDACTED]"))
			.field("path_prefix", &self.path_prefix)
			.field("request_timeout_secs", &self.request_timeout_secs)
			.finish()
	}
}

impl TrackerConfig {
	/// Loads defaults, then the config file, then the environment.
	///
	/// An explicit `path` must exist. Without one, the default location is
	/// used only if the file is present.
	pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
		let file = match path {
			Some(path) => Self::from_file(path)?,
			None => match default_config_path().filter(|p| p.is_file()) {
				Some(path) => Self::from_file(&path)?,
				None => Self::default(),
			},
		};

		Ok(file.merge(Self::from_env()?))
	}

	pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
		let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		tracing::debug!(path = %path.display(), "loaded tracker config file");
		Self::from_toml_str(&contents, path)
	}

	pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
		toml::from_str(contents).map_err(|source| ConfigError::TomlParse {
			path: path.to_path_buf(),
			source,
		})
	}

	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_env_with(|name| std::env::var(name).ok())
	}

	/// Reads `LOGTRACKER_*` variables through `lookup`. Empty values count as unset.
	pub fn from_env_with<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let var = |name| lookup(name).filter(|v| !v.trim().is_empty());

		let request_timeout_secs = match var(ENV_REQUEST_TIMEOUT_SECS) {
			Some(raw) => Some(raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
				field: ENV_REQUEST_TIMEOUT_SECS,
				message: format!("expected whole seconds, got {raw:?}"),
			})?),
			None => None,
		};

		Ok(Self {
			url: var(ENV_URL),
			application_id: var(ENV_APPLICATION_ID),
			public_key: var(ENV_PUBLIC_KEY),
			path_prefix: lookup(ENV_PATH_PREFIX),
			request_timeout_secs,
		})
	}

	/// Overlays `other` on `self`; fields set in `other` win.
	#[must_use]
	pub fn merge(self, other: TrackerConfig) -> Self {
		Self {
			url: other.url.or(self.url),
			application_id: other.application_id.or(self.application_id),
			public_key: other.public_key.or(self.public_key),
			path_prefix: other.path_prefix.or(self.path_prefix),
			request_timeout_secs: other.request_timeout_secs.or(self.request_timeout_secs),
		}
	}

	/// Checks that the three required settings are present and non-blank.
	pub fn validate(&self) -> Result<(), ConfigError> {
		let required = [
			("url", &self.url),
			("application_id", &self.application_id),
			("public_key", &self.public_key),
		];
		for (field, value) in required {
			if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
				return Err(ConfigError::MissingField(field));
			}
		}
		if self.request_timeout_secs == Some(0) {
			return Err(ConfigError::InvalidValue {
				field: "request_timeout_secs",
				message: "must be positive".to_string(),
			});
		}
		Ok(())
	}
}

/// `$XDG_CONFIG_HOME/logtracker/config.toml` or the platform equivalent.
pub fn default_config_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("logtracker").join("config.toml"))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |name| map.get(name).cloned()
	}

	#[test]
	fn test_parse_full_toml() {
		let config = TrackerConfig::from_toml_str(
			r#"
				url = "https://collector.example.com"
				application_id = "app_123"
				public_key = "pk_abc"
				path_prefix = ""
				request_timeout_secs = 5
			"#,
			Path::new("config.toml"),
		)
		.unwrap();

		assert_eq!(config.url.as_deref(), Some("https://collector.example.com"));
		assert_eq!(config.path_prefix.as_deref(), Some(""));
		assert_eq!(config.request_timeout_secs, Some(5));
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_parse_rejects_unknown_keys() {
		let result = TrackerConfig::from_toml_str("uri = \"x\"", Path::new("config.toml"));
		assert!(matches!(result, Err(ConfigError::TomlParse { .. })));
	}

	#[test]
	fn test_env_overrides_file() {
		let file = TrackerConfig {
			url: Some("https://file.example.com".to_string()),
			application_id: Some("app_file".to_string()),
			..Default::default()
		};
		let from_env = TrackerConfig::from_env_with(env(&[
			(ENV_URL, "https://env.example.com"),
			(ENV_PUBLIC_KEY, "pk_env"),
		]))
		.unwrap();

		let merged = file.merge(from_env);

		assert_eq!(merged.url.as_deref(), Some("https://env.example.com"));
		assert_eq!(merged.application_id.as_deref(), Some("app_file"));
		assert_eq!(merged.public_key.as_deref(), Some("pk_env"));
	}

	#[test]
	fn test_env_blank_values_are_unset() {
		let config = TrackerConfig::from_env_with(env(&[(ENV_URL, "  ")])).unwrap();
		assert!(config.url.is_none());
	}

	#[test]
	fn test_env_rejects_bad_timeout() {
		let result = TrackerConfig::from_env_with(env(&[(ENV_REQUEST_TIMEOUT_SECS, "ten")]));
		assert!(matches!(
			result,
			Err(ConfigError::InvalidValue {
				field: ENV_REQUEST_TIMEOUT_SECS,
				..
			})
		));
	}

	#[test]
	fn test_validate_reports_first_missing_field() {
		let config = TrackerConfig {
			url: Some("https://collector.example.com".to_string()),
			application_id: Some(" ".to_string()),
			..Default::default()
		};
		assert!(matches!(
			config.validate(),
			Err(ConfigError::MissingField("application_id"))
		));
	}

	#[test]
	fn test_load_explicit_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("tracker.toml");
		std::fs::write(&path, "application_id = \"app_disk\"\n").unwrap();

		let config = TrackerConfig::from_file(&path).unwrap();
		assert_eq!(config.application_id.as_deref(), Some("app_disk"));
	}

	#[test]
	fn test_load_missing_explicit_file_fails() {
		let dir = tempfile::tempdir().unwrap();
		let result = TrackerConfig::from_file(&dir.path().join("absent.toml"));
		assert!(matches!(result, Err(ConfigError::Io { .. })));
	}

	#[test]
	fn test_debug_redacts_public_key() {
		let config = TrackerConfig {
			public_key: Some("pk_secret".to_string()),
			..Default::default()
		};
		let rendered = format!("{config:?}");
		assert!(!rendered.contains("pk_secret"));
		assert!(rendered.contains("[REDACTED]"));
	}
}
