// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the tracking core types.

use thiserror::Error;

/// Errors raised while parsing or validating core tracking values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
	/// Unknown session kind string
	#[error("invalid session kind: {0}")]
	InvalidSessionKind(String),

	/// Unknown event type string
	#[error("invalid event type: {0}")]
	InvalidEventType(String),

	/// Unknown event category string
	#[error("invalid event category: {0}")]
	InvalidEventCategory(String),

	/// Session timeout must be a positive number of minutes
	#[error("invalid session timeout: {0} minutes (must be positive)")]
	InvalidTimeout(u32),

	/// Metadata must be a JSON object
	#[error("metadata must be a JSON object, got {0}")]
	InvalidMetadata(&'static str),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
