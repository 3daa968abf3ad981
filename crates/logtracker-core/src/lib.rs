// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the LogTracker collector.
//!
//! This crate holds the data model shared by the SDK and anything else that
//! speaks the collector protocol:
//!
//! - Sessions: [`SessionKind`], [`SessionTimeout`], [`SessionWindow`] and the
//!   start/end payloads
//! - Events: the [`EventType`] taxonomy with its [`EventCategory`] partition and
//!   the backend event payload
//! - [`Metadata`]: the open JSON object attached to both

pub mod error;
pub mod event;
pub mod metadata;
pub mod session;
pub mod timestamp;

pub use error::{CoreError, Result};
pub use event::{
	BackendEventRequest, ErrorResponse, EventCategory, EventId, EventResponse, EventSource,
	EventType, POINT_IN_TIME_DURATION_MS,
};
pub use metadata::Metadata;
pub use session::{
	SessionEndRequest, SessionId, SessionKind, SessionStartRequest, SessionStartResponse,
	SessionTimeout, SessionWindow,
};
