// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Host-provided persistence for the current session id.
//!
//! The client never reaches for cookies or other ambient storage. Hosts that
//! want `start_session` to remember its id (and `end_stored_session` to find
//! it again) pass a [`SessionStore`] to the builder.
//!
//! # Example
//!
//! ```ignore
//! use logtracker::{SessionStore, TrackerClient};
//! use async_trait::async_trait;
//!
//! struct CookieJarStore { /* ... */ }
//!
//! #[async_trait]
//! impl SessionStore for CookieJarStore {
//!     async fn get(&self, key: &str) -> logtracker::Result<Option<String>> { /* ... */ }
//!     async fn set(&self, key: &str, value: &str) -> logtracker::Result<()> { /* ... */ }
//!     async fn remove(&self, key: &str) -> logtracker::Result<()> { /* ... */ }
//! }
//! ```

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{Result, TrackerError};

/// Key under which the client stores the current session id.
pub const SESSION_KEY: &str = "log-tracker-session";

/// Named string storage supplied by the host.
#[async_trait]
pub trait SessionStore: Send + Sync {
	async fn get(&self, key: &str) -> Result<Option<String>>;

	async fn set(&self, key: &str, value: &str) -> Result<()>;

	async fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local store, lost on exit.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
	values: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl SessionStore for MemorySessionStore {
	async fn get(&self, key: &str) -> Result<Option<String>> {
		Ok(self.values.read().await.get(key).cloned())
	}

	async fn set(&self, key: &str, value: &str) -> Result<()> {
		self
			.values
			.write()
			.await
			.insert(key.to_string(), value.to_string());
		Ok(())
	}

	async fn remove(&self, key: &str) -> Result<()> {
		self.values.write().await.remove(key);
		Ok(())
	}
}

/// Stores each key as a small file in one directory.
///
/// Lets separate processes (for example consecutive CLI invocations) share
/// the current session id.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
	dir: PathBuf,
}

impl FileSessionStore {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	/// `$XDG_STATE_HOME/logtracker`, falling back to the local data directory
	/// on platforms without a state directory.
	pub fn default_location() -> Result<Self> {
		let base = dirs::state_dir()
			.or_else(dirs::data_local_dir)
			.ok_or_else(|| TrackerError::SessionStore("could not determine state directory".to_string()))?;
		Ok(Self::new(base.join("logtracker")))
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	fn path_for(&self, key: &str) -> Result<PathBuf> {
		let valid = !key.is_empty()
			&& key
				.chars()
				.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
		if !valid {
			return Err(TrackerError::SessionStore(format!("invalid key: {key:?}")));
		}
		Ok(self.dir.join(key))
	}
}

fn io_error(action: &str, path: &Path, err: std::io::Error) -> TrackerError {
	TrackerError::SessionStore(format!("failed to {action} {}: {err}", path.display()))
}

#[async_trait]
impl SessionStore for FileSessionStore {
	async fn get(&self, key: &str) -> Result<Option<String>> {
		let path = self.path_for(key)?;
		match tokio::fs::read_to_string(&path).await {
			Ok(contents) => {
				let value = contents.trim();
				Ok((!value.is_empty()).then(|| value.to_string()))
			}
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
			Err(e) => Err(io_error("read", &path, e)),
		}
	}

	async fn set(&self, key: &str, value: &str) -> Result<()> {
		let path = self.path_for(key)?;
		tokio::fs::create_dir_all(&self.dir)
			.await
			.map_err(|e| io_error("create", &self.dir, e))?;
		tokio::fs::write(&path, value)
			.await
			.map_err(|e| io_error("write", &path, e))?;
		debug!(path = %path.display(), "Stored session value");
		Ok(())
	}

	async fn remove(&self, key: &str) -> Result<()> {
		let path = self.path_for(key)?;
		match tokio::fs::remove_file(&path).await {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
			Err(e) => Err(io_error("remove", &path, e)),
		}
	}
}
