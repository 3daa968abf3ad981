// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tracking client for session and backend event lifecycles.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use logtracker_core::{
	BackendEventRequest, ErrorResponse, EventCategory, EventId, EventResponse, EventSource,
	EventType, Metadata, SessionEndRequest, SessionId, SessionKind, SessionStartRequest,
	SessionStartResponse, SessionTimeout, SessionWindow, POINT_IN_TIME_DURATION_MS,
};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError, FALLBACK_ERROR_MESSAGE};
use crate::http;
use crate::store::{SessionStore, SESSION_KEY};

/// Default path segment between the base URL and the `/track/...` routes.
pub const DEFAULT_PATH_PREFIX: &str = "/api";

/// Transport settings for the tracking client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
	/// HTTP request deadline. `None` keeps the transport default.
	pub request_timeout: Option<Duration>,
	/// Path prefix for every route, e.g. `/api`. May be empty.
	pub path_prefix: String,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			request_timeout: None,
			path_prefix: DEFAULT_PATH_PREFIX.to_string(),
		}
	}
}

/// Builder for constructing a TrackerClient.
pub struct TrackerClientBuilder {
	base_url: Option<String>,
	application_id: Option<String>,
	public_key: Option<String>,
	session_store: Option<Arc<dyn SessionStore>>,
	clock: Arc<dyn Clock>,
	config: ClientConfig,
}

impl TrackerClientBuilder {
	/// Creates a new builder with default settings.
	pub fn new() -> Self {
		Self {
			base_url: None,
			application_id: None,
			public_key: None,
			session_store: None,
			clock: Arc::new(SystemClock),
			config: ClientConfig::default(),
		}
	}

	/// Creates a builder pre-populated from loaded configuration.
	///
	/// The configuration is validated first, so missing settings surface as
	/// [`TrackerError::Config`].
	pub fn from_config(config: &TrackerConfig) -> Result<Self> {
		config.validate()?;

		let mut builder = Self::new();
		builder.base_url = config.url.clone();
		builder.application_id = config.application_id.clone();
		builder.public_key = config.public_key.clone();
		if let Some(prefix) = &config.path_prefix {
			builder.config.path_prefix = prefix.clone();
		}
		builder.config.request_timeout = config.request_timeout_secs.map(Duration::from_secs);
		Ok(builder)
	}

	/// Sets the collector base URL.
	///
	/// Example: `https://collector.example.com`
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());
		self
	}

	/// Sets the application identifier sent as `x-application-id`.
	pub fn application_id(mut self, id: impl Into<String>) -> Self {
		self.application_id = Some(id.into());
		self
	}

	/// Sets the public key sent as `x-public-key`.
	pub fn public_key(mut self, key: impl Into<String>) -> Self {
		self.public_key = Some(key.into());
		self
	}

	/// Sets the route prefix. Older collectors serve `/track/...` at the root; pass `""` for those.
	pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.config.path_prefix = prefix.into();
		self
	}

	/// Sets the HTTP request timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.config.request_timeout = Some(timeout);
		self
	}

	/// Sets where the current session id is persisted.
	pub fn session_store<S: SessionStore + 'static>(mut self, store: S) -> Self {
		self.session_store = Some(Arc::new(store));
		self
	}

	/// Like [`session_store`](Self::session_store) for a store the host keeps a handle to.
	pub fn shared_session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
		self.session_store = Some(store);
		self
	}

	/// Replaces the system clock, typically with a [`ManualClock`](crate::ManualClock) in tests.
	pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;
		self
	}

	/// Builds the TrackerClient. Performs no I/O.
	pub fn build(self) -> Result<TrackerClient> {
		let base_url = required("base_url", self.base_url)?;
		let application_id = required("application_id", self.application_id)?;
		let public_key = required("public_key", self.public_key)?;

		let base_url = parse_base_url(&base_url)?;
		let path_prefix = self
			.config
			.path_prefix
			.split('/')
			.filter(|segment| !segment.is_empty())
			.map(str::to_string)
			.collect();

		let mut http_builder = http::builder(http::auth_headers(&application_id, &public_key)?);
		if let Some(timeout) = self.config.request_timeout {
			if timeout.is_zero() {
				return Err(TrackerError::InvalidConfig {
					field: "request_timeout",
					reason: "must be positive".to_string(),
				});
			}
			http_builder = http_builder.timeout(timeout);
		}
		let http_client = http_builder.build().map_err(TrackerError::RequestFailed)?;

		info!(
			base_url = %base_url,
			application_id = %application_id,
			sdk_name = http::SDK_NAME,
			sdk_version = http::SDK_VERSION,
			"Tracker client initialized"
		);

		Ok(TrackerClient {
			inner: Arc::new(TrackerClientInner {
				base_url,
				path_prefix,
				http_client,
				session_store: self.session_store,
				clock: self.clock,
				config: self.config,
			}),
		})
	}
}

impl Default for TrackerClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

fn required(field: &'static str, value: Option<String>) -> Result<String> {
	match value {
		Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
		Some(_) => Err(TrackerError::InvalidConfig {
			field,
			reason: "must not be empty".to_string(),
		}),
		None => Err(TrackerError::InvalidConfig {
			field,
			reason: "is required".to_string(),
		}),
	}
}

fn parse_base_url(raw: &str) -> Result<Url> {
	let invalid = |reason: String| TrackerError::InvalidConfig {
		field: "base_url",
		reason,
	};

	let mut url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
	if !matches!(url.scheme(), "http" | "https") {
		return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
	}
	if url.cannot_be_a_base() {
		return Err(invalid("must be an absolute URL".to_string()));
	}
	url.set_query(None);
	url.set_fragment(None);
	if let Ok(mut segments) = url.path_segments_mut() {
		segments.pop_if_empty();
	}
	Ok(url)
}

/// Internal client state. Immutable after construction.
struct TrackerClientInner {
	base_url: Url,
	path_prefix: Vec<String>,
	http_client: Client,
	session_store: Option<Arc<dyn SessionStore>>,
	clock: Arc<dyn Clock>,
	config: ClientConfig,
}

/// Optional parts of a session.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
	/// Correlates the session with an earlier session or event.
	pub link_id: Option<String>,
	pub metadata: Option<Metadata>,
	/// Minutes until the collector expires the session. Defaults to 30.
	pub timeout: SessionTimeout,
}

impl SessionOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn link_id(mut self, link_id: impl Into<String>) -> Self {
		self.link_id = Some(link_id.into());
		self
	}

	pub fn metadata(mut self, metadata: Metadata) -> Self {
		self.metadata = Some(metadata);
		self
	}

	pub fn timeout(mut self, timeout: SessionTimeout) -> Self {
		self.timeout = timeout;
		self
	}

	/// Sets the timeout from a raw minute count, rejecting zero.
	pub fn timeout_minutes(self, minutes: u32) -> Result<Self> {
		Ok(self.timeout(SessionTimeout::from_minutes(minutes)?))
	}
}

/// Optional parts of a backend event.
#[derive(Debug, Clone, Default)]
pub struct EventOptions {
	pub link_id: Option<String>,
	pub metadata: Option<Metadata>,
}

impl EventOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn link_id(mut self, link_id: impl Into<String>) -> Self {
		self.link_id = Some(link_id.into());
		self
	}

	pub fn metadata(mut self, metadata: Metadata) -> Self {
		self.metadata = Some(metadata);
		self
	}
}

/// An open backend event.
///
/// Created by [`TrackerClient::start_backend_event`] and consumed by
/// [`TrackerClient::end_backend_event`]. The handle is not `Clone`, so an
/// event can be closed at most once.
#[derive(Debug)]
#[must_use = "the event is only recorded when passed to `end_backend_event`"]
pub struct BackendEvent {
	session_id: SessionId,
	source: EventSource,
	event_type: EventType,
	link_id: Option<String>,
	metadata: Option<Metadata>,
	started_at: Instant,
}

impl BackendEvent {
	pub fn session_id(&self) -> &SessionId {
		&self.session_id
	}

	pub fn source(&self) -> EventSource {
		self.source
	}

	pub fn event_type(&self) -> EventType {
		self.event_type
	}

	pub fn link_id(&self) -> Option<&str> {
		self.link_id.as_deref()
	}

	pub fn metadata(&self) -> Option<&Metadata> {
		self.metadata.as_ref()
	}

	/// Monotonic instant captured when the event was opened.
	pub fn started_at(&self) -> Instant {
		self.started_at
	}

	/// Rewrites an open event as the failure of the operation it was timing.
	fn into_failure(mut self, message: &str) -> Self {
		self.event_type = failure_type(self.event_type);
		let failure = Metadata::new().insert("error", message);
		self.metadata = Some(self.metadata.unwrap_or_default().merge(failure));
		self
	}
}

/// Error-category counterpart of an event type.
fn failure_type(event_type: EventType) -> EventType {
	match event_type {
		EventType::ApiCall | EventType::ApiSuccess => EventType::ApiError,
		EventType::AuthAttempt | EventType::AuthSuccess => EventType::AuthFailure,
		t if t.category() == EventCategory::Error => t,
		_ => EventType::Error,
	}
}

/// Client for tracking sessions and backend events.
///
/// Cheap to clone; clones share the HTTP connection pool. Every network
/// operation makes exactly one request and never retries.
///
/// # Example
///
/// ```ignore
/// use logtracker::{EventOptions, EventType, SessionKind, SessionOptions, TrackerClient};
///
/// let client = TrackerClient::builder()
///     .base_url("https://collector.example.com")
///     .application_id("app_123")
///     .public_key("pk_live_abc")
///     .build()?;
///
/// let session_id = client
///     .start_session(SessionKind::Authenticated, "user-42", SessionOptions::new())
///     .await?;
///
/// let event = client.start_backend_event(EventType::ApiCall, &session_id, EventOptions::new())?;
/// // call the API...
/// let event_id = client.end_backend_event(event).await?;
///
/// client.end_session(&session_id).await?;
/// ```
#[derive(Clone)]
pub struct TrackerClient {
	inner: Arc<TrackerClientInner>,
}

impl TrackerClient {
	/// Creates a new builder for constructing a TrackerClient.
	pub fn builder() -> TrackerClientBuilder {
		TrackerClientBuilder::new()
	}

	/// Normalized collector base URL.
	pub fn base_url(&self) -> &Url {
		&self.inner.base_url
	}

	pub fn config(&self) -> &ClientConfig {
		&self.inner.config
	}

	/// Opens a session and returns the id the collector assigned.
	///
	/// When a session store is configured the id is saved under
	/// [`SESSION_KEY`] before returning.
	pub async fn start_session(
		&self,
		kind: SessionKind,
		user: &str,
		options: SessionOptions,
	) -> Result<SessionId> {
		if user.trim().is_empty() {
			return Err(TrackerError::Validation("user must not be empty".to_string()));
		}

		let window = SessionWindow::starting_at(self.inner.clock.now(), options.timeout);
		let request =
			SessionStartRequest::new(kind, user, window, options.link_id, options.metadata);

		let url = self.endpoint(&["track", "sessions"])?;
		let body = self.post(url, &request).await?;
		let response: SessionStartResponse = decode(&body, "session start")?;
		let session_id = response.session_id;
		if session_id.as_str().is_empty() {
			return Err(TrackerError::MalformedResponse(
				"session start response has an empty session_id".to_string(),
			));
		}

		if let Some(store) = &self.inner.session_store {
			store.set(SESSION_KEY, session_id.as_str()).await.map_err(|e| {
				error!(session_id = %session_id, error = %e, "Failed to persist session id");
				e
			})?;
		}

		info!(
			session_id = %session_id,
			kind = %kind,
			timeout_minutes = options.timeout.minutes(),
			"Session started"
		);

		Ok(session_id)
	}

	/// Ends a session by id.
	///
	/// Ending the same session twice is forwarded to the collector, which
	/// decides how to answer.
	pub async fn end_session(&self, session_id: &SessionId) -> Result<()> {
		require_session_id(session_id)?;

		let request = SessionEndRequest {
			timestamp: self.inner.clock.now(),
		};
		let url = self.endpoint(&["track", "sessions", session_id.as_str(), "end"])?;
		self.post(url, &request).await?;

		info!(session_id = %session_id, "Session ended");
		Ok(())
	}

	/// Ends the session held by the session store and clears it.
	///
	/// Returns the id that was ended. Fails with
	/// [`TrackerError::NoActiveSession`] when no store is configured or it
	/// holds no id, which also makes a second call fail without a request.
	///
	/// Once the collector has ended the session the id is returned even if
	/// clearing the store fails; that failure is logged and a later call
	/// would send the end request again.
	pub async fn end_stored_session(&self) -> Result<SessionId> {
		let store = self
			.inner
			.session_store
			.as_ref()
			.ok_or(TrackerError::NoActiveSession)?;
		let session_id = self
			.stored_session_id()
			.await?
			.ok_or(TrackerError::NoActiveSession)?;

		self.end_session(&session_id).await?;
		if let Err(e) = store.remove(SESSION_KEY).await {
			error!(session_id = %session_id, error = %e, "Failed to clear ended session from store");
		}

		Ok(session_id)
	}

	/// The session id currently held by the session store, if any.
	pub async fn stored_session_id(&self) -> Result<Option<SessionId>> {
		match &self.inner.session_store {
			Some(store) => Ok(store
				.get(SESSION_KEY)
				.await?
				.filter(|id| !id.is_empty())
				.map(SessionId::from)),
			None => Ok(None),
		}
	}

	/// Opens a backend event locally. No request is made until the handle is
	/// passed to [`end_backend_event`](Self::end_backend_event).
	///
	/// The start instant comes from the monotonic clock. The session is not
	/// checked with the collector.
	pub fn start_backend_event(
		&self,
		event_type: EventType,
		session_id: &SessionId,
		options: EventOptions,
	) -> Result<BackendEvent> {
		require_session_id(session_id)?;

		Ok(BackendEvent {
			session_id: session_id.clone(),
			source: EventSource::Backend,
			event_type,
			link_id: options.link_id,
			metadata: options.metadata,
			started_at: self.inner.clock.monotonic(),
		})
	}

	/// Closes an event opened with [`start_backend_event`](Self::start_backend_event),
	/// reporting the elapsed monotonic time in milliseconds.
	pub async fn end_backend_event(&self, event: BackendEvent) -> Result<EventId> {
		let elapsed = self
			.inner
			.clock
			.monotonic()
			.saturating_duration_since(event.started_at);

		let request = BackendEventRequest {
			session_id: event.session_id,
			source: event.source,
			event_type: event.event_type,
			link_id: event.link_id,
			metadata: event.metadata,
			duration: duration_ms(elapsed),
			timestamp: self.inner.clock.now(),
		};

		self.send_event(request).await
	}

	/// Records an instantaneous error-category event.
	///
	/// Sent with the point-in-time duration of 1 ms.
	pub async fn end_backend_error_event(
		&self,
		event_type: EventType,
		session_id: &SessionId,
		options: EventOptions,
	) -> Result<EventId> {
		self
			.send_point_event(EventCategory::Error, event_type, session_id, options)
			.await
	}

	/// Records an instantaneous success-category event.
	///
	/// Sent with the point-in-time duration of 1 ms.
	pub async fn end_backend_success_event(
		&self,
		event_type: EventType,
		session_id: &SessionId,
		options: EventOptions,
	) -> Result<EventId> {
		self
			.send_point_event(EventCategory::Success, event_type, session_id, options)
			.await
	}

	/// Times an async operation as a backend event.
	///
	/// On success the event is sent as `event_type`. On failure it is sent as
	/// the matching error type (`api_call` becomes `api_error`, `auth_attempt`
	/// becomes `auth_failure`, anything else `error`) with the failure message
	/// under the `error` metadata key, and the call returns
	/// [`TrackerError::Operation`].
	///
	/// The operation's own outcome is always returned. A failure to report
	/// the event is logged and does not replace it.
	///
	/// # Example
	///
	/// ```ignore
	/// let orders = client
	///     .track_backend(EventType::ApiCall, &session_id, EventOptions::new(), || async {
	///         fetch_orders().await
	///     })
	///     .await?;
	/// ```
	pub async fn track_backend<F, Fut, T, E>(
		&self,
		event_type: EventType,
		session_id: &SessionId,
		options: EventOptions,
		f: F,
	) -> Result<T>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = std::result::Result<T, E>>,
		E: std::fmt::Display,
	{
		let event = self.start_backend_event(event_type, session_id, options)?;

		match f().await {
			Ok(value) => {
				self.report_tracked(event).await;
				Ok(value)
			}
			Err(e) => {
				let message = e.to_string();
				self.report_tracked(event.into_failure(&message)).await;
				Err(TrackerError::Operation(message))
			}
		}
	}

	async fn report_tracked(&self, event: BackendEvent) {
		let session_id = event.session_id.clone();
		let event_type = event.event_type;
		if let Err(e) = self.end_backend_event(event).await {
			warn!(
				session_id = %session_id,
				event_type = %event_type,
				error = %e,
				"Failed to report tracked operation"
			);
		}
	}

	async fn send_point_event(
		&self,
		expected: EventCategory,
		event_type: EventType,
		session_id: &SessionId,
		options: EventOptions,
	) -> Result<EventId> {
		if event_type.category() != expected {
			return Err(TrackerError::CategoryMismatch {
				expected,
				actual: event_type,
			});
		}
		require_session_id(session_id)?;

		let request = BackendEventRequest {
			session_id: session_id.clone(),
			source: EventSource::Backend,
			event_type,
			link_id: options.link_id,
			metadata: options.metadata,
			duration: POINT_IN_TIME_DURATION_MS,
			timestamp: self.inner.clock.now(),
		};

		self.send_event(request).await
	}

	async fn send_event(&self, request: BackendEventRequest) -> Result<EventId> {
		let url = self.endpoint(&["track", "events", "backend"])?;
		let body = self.post(url, &request).await?;
		let response: EventResponse = decode(&body, "backend event")?;
		if response.event_id.as_str().is_empty() {
			return Err(TrackerError::MalformedResponse(
				"backend event response has an empty event_id".to_string(),
			));
		}

		info!(
			event_id = %response.event_id,
			session_id = %request.session_id,
			event_type = %request.event_type,
			duration_ms = request.duration,
			"Backend event recorded"
		);

		Ok(response.event_id)
	}

	/// `{base_url}{path_prefix}/{segments...}` with each segment percent-encoded.
	fn endpoint(&self, segments: &[&str]) -> Result<Url> {
		let mut url = self.inner.base_url.clone();
		url
			.path_segments_mut()
			.map_err(|_| TrackerError::InvalidConfig {
				field: "base_url",
				reason: "must be an absolute URL".to_string(),
			})?
			.pop_if_empty()
			.extend(&self.inner.path_prefix)
			.extend(segments);
		Ok(url)
	}

	/// Sends one POST and returns the body of a success response.
	async fn post<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<String> {
		debug!(url = %url, "Sending tracking request");

		let response = self
			.inner
			.http_client
			.post(url.clone())
			.json(body)
			.send()
			.await?;

		let status = response.status();
		let text = response.text().await?;

		if !status.is_success() {
			let message = serde_json::from_str::<ErrorResponse>(&text)
				.ok()
				.and_then(|body| body.error)
				.filter(|message| !message.is_empty())
				.unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());
			error!(url = %url, status = status.as_u16(), message = %message, "Tracking request failed");
			return Err(TrackerError::ServerError {
				status: status.as_u16(),
				message,
			});
		}

		Ok(text)
	}
}

fn decode<T: DeserializeOwned>(body: &str, what: &str) -> Result<T> {
	serde_json::from_str(body).map_err(|e| {
		warn!(error = %e, "Collector returned an unreadable {what} response");
		TrackerError::MalformedResponse(format!("{what} response: {e}"))
	})
}

fn require_session_id(session_id: &SessionId) -> Result<()> {
	if session_id.as_str().trim().is_empty() {
		return Err(TrackerError::Validation(
			"session id must not be empty".to_string(),
		));
	}
	Ok(())
}

fn duration_ms(elapsed: Duration) -> f64 {
	elapsed.as_nanos() as f64 / 1_000_000.0
}
