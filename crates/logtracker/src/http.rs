// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP client construction with the collector's fixed headers.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder};

use crate::error::{Result, TrackerError};

/// SDK name for the User-Agent header.
pub const SDK_NAME: &str = "logtracker-rust";
/// SDK version for the User-Agent header.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APPLICATION_ID_HEADER: &str = "x-application-id";
pub const PUBLIC_KEY_HEADER: &str = "x-public-key";

/// Returns the SDK User-Agent string.
///
/// Format: `logtracker-rust/{version}`
pub fn user_agent() -> String {
	format!("{SDK_NAME}/{SDK_VERSION}")
}

/// Headers attached to every collector request.
///
/// The public key value is marked sensitive so it is redacted from the
/// header map's `Debug` output.
pub fn auth_headers(application_id: &str, public_key: &str) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();
	headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
	headers.insert(
		APPLICATION_ID_HEADER,
		header_value("application_id", application_id)?,
	);

	let mut key = header_value("public_key", public_key)?;
	key.set_sensitive(true);
	headers.insert(PUBLIC_KEY_HEADER, key);

	Ok(headers)
}

fn header_value(field: &'static str, value: &str) -> Result<HeaderValue> {
	HeaderValue::from_str(value).map_err(|_| TrackerError::InvalidConfig {
		field,
		reason: "contains characters not allowed in an HTTP header".to_string(),
	})
}

/// Creates a client builder with the SDK User-Agent and the given default headers.
///
/// Default headers are applied by reqwest to every request the client sends,
/// so individual calls cannot drop or replace them by accident.
///
/// # Example
/// ```ignore
/// let headers = logtracker::http::auth_headers("app_123", "pk_live_abc")?;
/// let client = logtracker::http::builder(headers)
///     .timeout(Duration::from_secs(10))
///     .build()?;
/// ```
pub fn builder(default_headers: HeaderMap) -> ClientBuilder {
	Client::builder()
		.user_agent(user_agent())
		.default_headers(default_headers)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn user_agent_has_correct_format() {
		let ua = user_agent();
		let parts: Vec<&str> = ua.split('/').collect();
		assert_eq!(parts.len(), 2);
		assert_eq!(parts[0], "logtracker-rust");
		assert_eq!(parts[1], SDK_VERSION);
	}

	#[test]
	fn auth_headers_contains_all_three() {
		let headers = auth_headers("app_123", "pk_abc").unwrap();
		assert_eq!(headers.len(), 3);
		assert_eq!(headers[CONTENT_TYPE], "application/json");
		assert_eq!(headers[APPLICATION_ID_HEADER], "app_123");
		assert_eq!(headers[PUBLIC_KEY_HEADER], "pk_abc");
	}

	#[test]
	fn public_key_is_sensitive() {
		let headers = auth_headers("app_123", "pk_abc").unwrap();
		assert!(headers[PUBLIC_KEY_HEADER].is_sensitive());
		assert!(!format!("{headers:?}").contains("pk_abc"));
	}

	#[test]
	fn rejects_header_unsafe_values() {
		let result = auth_headers("app\n123", "pk_abc");
		assert!(matches!(
			result,
			Err(TrackerError::InvalidConfig {
				field: "application_id",
				..
			})
		));
	}

	#[test]
	fn builder_with_headers_builds() {
		let headers = auth_headers("app_123", "pk_abc").unwrap();
		assert!(builder(headers).build().is_ok());
	}
}
