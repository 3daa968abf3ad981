// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Event taxonomy and the backend event wire payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::metadata::Metadata;
use crate::session::SessionId;

/// Duration reported by events that mark a point in time rather than a
/// measured interval.
pub const POINT_IN_TIME_DURATION_MS: f64 = 1.0;

/// Server-assigned event identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl AsRef<str> for EventId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl From<&str> for EventId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

impl std::fmt::Display for EventId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

/// Where an event originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventSource {
	Backend,
}

impl std::fmt::Display for EventSource {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			EventSource::Backend => write!(f, "Backend"),
		}
	}
}

/// Partition of the event taxonomy.
///
/// The category decides which client entry point accepts an event type and
/// lets the collector aggregate outcomes without parsing names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
	Neutral,
	Error,
	Success,
}

impl std::fmt::Display for EventCategory {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			EventCategory::Neutral => write!(f, "neutral"),
			EventCategory::Error => write!(f, "error"),
			EventCategory::Success => write!(f, "success"),
		}
	}
}

impl std::str::FromStr for EventCategory {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"neutral" => Ok(EventCategory::Neutral),
			"error" => Ok(EventCategory::Error),
			"success" => Ok(EventCategory::Success),
			_ => Err(CoreError::InvalidEventCategory(s.to_string())),
		}
	}
}

/// Kind of a tracked event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
	ApiCall,
	AuthAttempt,
	PageView,
	Click,
	FormSubmit,

	Error,
	ApiError,
	AuthFailure,
	ValidationError,

	ApiSuccess,
	AuthSuccess,
}

impl EventType {
	pub const ALL: [EventType; 11] = [
		EventType::ApiCall,
		EventType::AuthAttempt,
		EventType::PageView,
		EventType::Click,
		EventType::FormSubmit,
		EventType::Error,
		EventType::ApiError,
		EventType::AuthFailure,
		EventType::ValidationError,
		EventType::ApiSuccess,
		EventType::AuthSuccess,
	];

	#[must_use]
	pub fn category(&self) -> EventCategory {
		match self {
			EventType::ApiCall
			| EventType::AuthAttempt
			| EventType::PageView
			| EventType::Click
			| EventType::FormSubmit => EventCategory::Neutral,
			EventType::Error
			| EventType::ApiError
			| EventType::AuthFailure
			| EventType::ValidationError => EventCategory::Error,
			EventType::ApiSuccess | EventType::AuthSuccess => EventCategory::Success,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			EventType::ApiCall => "api_call",
			EventType::AuthAttempt => "auth_attempt",
			EventType::PageView => "page_view",
			EventType::Click => "click",
			EventType::FormSubmit => "form_submit",
			EventType::Error => "error",
			EventType::ApiError => "api_error",
			EventType::AuthFailure => "auth_failure",
			EventType::ValidationError => "validation_error",
			EventType::ApiSuccess => "api_success",
			EventType::AuthSuccess => "auth_success",
		}
	}
}

impl std::fmt::Display for EventType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for EventType {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		EventType::ALL
			.into_iter()
			.find(|t| t.as_str() == s)
			.ok_or_else(|| CoreError::InvalidEventType(s.to_string()))
	}
}

/// Body of `POST /track/events/backend`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendEventRequest {
	pub session_id: SessionId,
	pub source: EventSource,
	#[serde(rename = "type")]
	pub event_type: EventType,
	pub link_id: Option<String>,
	pub metadata: Option<Metadata>,
	/// Elapsed milliseconds, never negative.
	pub duration: f64,
	#[serde(serialize_with = "crate::timestamp::serialize")]
	pub timestamp: DateTime<Utc>,
}

/// Response to `POST /track/events/backend`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResponse {
	pub event_id: EventId,
}

/// Body the collector returns alongside a non-success status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
	#[serde(default)]
	pub error: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use proptest::prelude::*;
	use serde_json::json;

	fn any_event_type() -> impl Strategy<Value = EventType> {
		proptest::sample::select(EventType::ALL.to_vec())
	}

	proptest! {
		#[test]
		fn event_type_roundtrip(event_type in any_event_type()) {
			let parsed: EventType = event_type.to_string().parse().unwrap();
			prop_assert_eq!(event_type, parsed);
		}

		#[test]
		fn event_type_serde_matches_display(event_type in any_event_type()) {
			let encoded = serde_json::to_value(event_type).unwrap();
			prop_assert_eq!(encoded, json!(event_type.as_str()));
		}
	}

	#[test]
	fn test_taxonomy_partition() {
		let of = |category| {
			EventType::ALL
				.into_iter()
				.filter(|t| t.category() == category)
				.map(|t| t.as_str())
				.collect::<Vec<_>>()
		};

		assert_eq!(
			of(EventCategory::Neutral),
			vec!["api_call", "auth_attempt", "page_view", "click", "form_submit"]
		);
		assert_eq!(
			of(EventCategory::Error),
			vec!["error", "api_error", "auth_failure", "validation_error"]
		);
		assert_eq!(of(EventCategory::Success), vec!["api_success", "auth_success"]);
	}

	#[test]
	fn test_event_type_rejects_unknown() {
		let err = "logout".parse::<EventType>().unwrap_err();
		assert_eq!(err, CoreError::InvalidEventType("logout".to_string()));
	}

	#[test]
	fn test_event_category_parse() {
		assert_eq!("error".parse::<EventCategory>().unwrap(), EventCategory::Error);
		assert!("fatal".parse::<EventCategory>().is_err());
	}

	#[test]
	fn test_backend_event_request_wire_shape() {
		let request = BackendEventRequest {
			session_id: SessionId::new("S1"),
			source: EventSource::Backend,
			event_type: EventType::ApiError,
			link_id: Some("req-7".to_string()),
			metadata: None,
			duration: POINT_IN_TIME_DURATION_MS,
			timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
		};

		assert_eq!(
			serde_json::to_value(&request).unwrap(),
			json!({
				"sessionId": "S1",
				"source": "Backend",
				"type": "api_error",
				"linkId": "req-7",
				"metadata": null,
				"duration": 1.0,
				"timestamp": "2025-06-01T12:00:00.000Z",
			})
		);
	}

	#[test]
	fn test_error_response_field_is_optional() {
		let with: ErrorResponse = serde_json::from_value(json!({"error": "not found"})).unwrap();
		assert_eq!(with.error.as_deref(), Some("not found"));

		let without: ErrorResponse = serde_json::from_value(json!({"detail": "x"})).unwrap();
		assert!(without.error.is_none());
	}
}
