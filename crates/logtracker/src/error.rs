// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the tracking SDK.

use logtracker_core::{CoreError, EventCategory, EventType};
use thiserror::Error;

use crate::config::ConfigError;

/// Message used when a failed response carries no `error` field.
pub const FALLBACK_ERROR_MESSAGE: &str = "An error occurred";

/// Tracking SDK errors.
#[derive(Debug, Error)]
pub enum TrackerError {
	/// A required client setting is missing or unusable.
	#[error("invalid configuration for {field}: {reason}")]
	InvalidConfig { field: &'static str, reason: String },

	/// Loading configuration from file or environment failed.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// The request never produced an HTTP response (connect, DNS, timeout, body).
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// The collector answered with a non-success status.
	#[error("server error ({status}): {message}")]
	ServerError { status: u16, message: String },

	/// A success response did not contain the expected JSON.
	#[error("malformed response: {0}")]
	MalformedResponse(String),

	/// Input rejected before any request was made.
	#[error("validation failed: {0}")]
	Validation(String),

	/// An event type was passed to the entry point of another category.
	#[error("event type {actual} is not in the {expected} category")]
	CategoryMismatch {
		expected: EventCategory,
		actual: EventType,
	},

	/// No session id was supplied and none is held by the session store.
	#[error("no active session")]
	NoActiveSession,

	/// The session store failed to read or write.
	#[error("session store error: {0}")]
	SessionStore(String),

	/// The operation wrapped by `track_backend` failed.
	#[error("tracked operation failed: {0}")]
	Operation(String),

	#[error(transparent)]
	Core(#[from] CoreError),
}

impl TrackerError {
	/// HTTP status of a service error.
	pub fn status(&self) -> Option<u16> {
		match self {
			TrackerError::ServerError { status, .. } => Some(*status),
			TrackerError::RequestFailed(e) => e.status().map(|s| s.as_u16()),
			_ => None,
		}
	}

	/// The collector rejected the request (4xx): bad input or credentials.
	pub fn is_client_error(&self) -> bool {
		matches!(self, TrackerError::ServerError { status, .. } if (400..500).contains(status))
	}

	/// The collector failed or is unavailable (5xx).
	pub fn is_server_error(&self) -> bool {
		matches!(self, TrackerError::ServerError { status, .. } if (500..600).contains(status))
	}
}

/// Result type alias for tracking operations.
pub type Result<T> = std::result::Result<T, TrackerError>;
