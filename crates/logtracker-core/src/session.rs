// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session types: kinds, expiry windows, and the session wire payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::metadata::Metadata;

/// Server-assigned session identifier.
///
/// The collector chooses the format; the client treats it as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn into_inner(self) -> String {
		self.0
	}
}

impl AsRef<str> for SessionId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl From<String> for SessionId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

impl From<&str> for SessionId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

impl std::fmt::Display for SessionId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

/// The authentication phase a session covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionKind {
	/// Before the user has signed in
	PreAuthentication,
	/// A signed-in user
	Authenticated,
	/// A credential refresh
	RefreshAuthentication,
}

impl SessionKind {
	pub const ALL: [SessionKind; 3] = [
		SessionKind::PreAuthentication,
		SessionKind::Authenticated,
		SessionKind::RefreshAuthentication,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			SessionKind::PreAuthentication => "pre-authentication",
			SessionKind::Authenticated => "authenticated",
			SessionKind::RefreshAuthentication => "refresh-authentication",
		}
	}
}

impl std::fmt::Display for SessionKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for SessionKind {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"pre-authentication" => Ok(SessionKind::PreAuthentication),
			"authenticated" => Ok(SessionKind::Authenticated),
			"refresh-authentication" => Ok(SessionKind::RefreshAuthentication),
			_ => Err(CoreError::InvalidSessionKind(s.to_string())),
		}
	}
}

/// Minutes until the collector expires a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionTimeout(u32);

impl SessionTimeout {
	pub const DEFAULT_MINUTES: u32 = 30;

	/// Creates a timeout, rejecting zero.
	pub fn from_minutes(minutes: u32) -> Result<Self, CoreError> {
		if minutes == 0 {
			return Err(CoreError::InvalidTimeout(minutes));
		}
		Ok(Self(minutes))
	}

	pub fn minutes(&self) -> u32 {
		self.0
	}

	pub fn as_duration(&self) -> chrono::Duration {
		chrono::Duration::minutes(i64::from(self.0))
	}
}

impl Default for SessionTimeout {
	fn default() -> Self {
		Self(Self::DEFAULT_MINUTES)
	}
}

impl TryFrom<u32> for SessionTimeout {
	type Error = CoreError;

	fn try_from(minutes: u32) -> Result<Self, Self::Error> {
		Self::from_minutes(minutes)
	}
}

/// Creation instant and expiry of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWindow {
	pub started_at: DateTime<Utc>,
	pub ends_at: DateTime<Utc>,
}

impl SessionWindow {
	/// Both bounds derive from the single `now` reading, so
	/// `ends_at - started_at` equals the timeout exactly.
	#[must_use]
	pub fn starting_at(now: DateTime<Utc>, timeout: SessionTimeout) -> Self {
		Self {
			started_at: now,
			ends_at: now + timeout.as_duration(),
		}
	}

	pub fn length(&self) -> chrono::Duration {
		self.ends_at - self.started_at
	}
}

/// Body of `POST /track/sessions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStartRequest {
	#[serde(rename = "type")]
	pub kind: SessionKind,
	pub user: String,
	pub link_id: Option<String>,
	pub metadata: Option<Metadata>,
	#[serde(serialize_with = "crate::timestamp::serialize")]
	pub timestamp: DateTime<Utc>,
	#[serde(serialize_with = "crate::timestamp::serialize")]
	pub end_at: DateTime<Utc>,
}

impl SessionStartRequest {
	pub fn new(
		kind: SessionKind,
		user: impl Into<String>,
		window: SessionWindow,
		link_id: Option<String>,
		metadata: Option<Metadata>,
	) -> Self {
		Self {
			kind,
			user: user.into(),
			link_id,
			metadata,
			timestamp: window.started_at,
			end_at: window.ends_at,
		}
	}
}

/// Response to `POST /track/sessions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStartResponse {
	pub session_id: SessionId,
}

/// Body of `POST /track/sessions/{id}/end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEndRequest {
	#[serde(serialize_with = "crate::timestamp::serialize")]
	pub timestamp: DateTime<Utc>,
}
