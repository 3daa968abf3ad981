// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rust SDK for the LogTracker collector.
//!
//! This crate provides a client for opening and closing user sessions and
//! recording timed backend events against a LogTracker collector. Each call
//! is a single request: there is no queue, batching, or retry.
//!
//! # Quick Start
//!
//! ```ignore
//! use logtracker::{
//!     EventOptions, EventType, MemorySessionStore, Metadata, SessionKind, SessionOptions,
//!     SessionTimeout, TrackerClient,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TrackerClient::builder()
//!         .base_url("https://collector.example.com")
//!         .application_id("app_123")
//!         .public_key("pk_live_abc")
//!         .session_store(MemorySessionStore::new())
//!         .build()?;
//!
//!     // Open a session; the id is also saved in the session store
//!     let session_id = client
//!         .start_session(
//!             SessionKind::Authenticated,
//!             "user-42",
//!             SessionOptions::new()
//!                 .timeout(SessionTimeout::from_minutes(10)?)
//!                 .metadata(Metadata::new().insert("plan", "pro")),
//!         )
//!         .await?;
//!
//!     // Time an API call
//!     let event = client.start_backend_event(EventType::ApiCall, &session_id, EventOptions::new())?;
//!     // ... call the API ...
//!     client.end_backend_event(event).await?;
//!
//!     // Record an instantaneous outcome
//!     client
//!         .end_backend_success_event(EventType::AuthSuccess, &session_id, EventOptions::new())
//!         .await?;
//!
//!     // Close the stored session
//!     client.end_stored_session().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Event Entry Points
//!
//! | Method | Event types | Duration |
//! |--------|-------------|----------|
//! | `start_backend_event` + `end_backend_event` | any | measured on the monotonic clock |
//! | `end_backend_error_event` | error category | 1 ms (point in time) |
//! | `end_backend_success_event` | success category | 1 ms (point in time) |
//! | `track_backend` | any | measured around a future |
//!
//! # Error Handling
//!
//! Service errors carry the HTTP status so callers can tell a rejected request
//! from an unavailable collector:
//!
//! ```ignore
//! use logtracker::TrackerError;
//!
//! match client.end_session(&session_id).await {
//!     Ok(()) => {}
//!     Err(e) if e.is_client_error() => eprintln!("rejected: {e}"),
//!     Err(e) if e.is_server_error() => eprintln!("collector unavailable: {e}"),
//!     Err(e) => eprintln!("request failed: {e}"),
//! }
//! ```

pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod store;

pub use client::{
	BackendEvent, ClientConfig, EventOptions, SessionOptions, TrackerClient, TrackerClientBuilder,
	DEFAULT_PATH_PREFIX,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, TrackerConfig};
pub use error::{Result, TrackerError, FALLBACK_ERROR_MESSAGE};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, SESSION_KEY};

// Re-export types from logtracker-core that users may need
pub use logtracker_core::{
	EventCategory, EventId, EventSource, EventType, Metadata, SessionId, SessionKind,
	SessionTimeout, POINT_IN_TIME_DURATION_MS,
};
