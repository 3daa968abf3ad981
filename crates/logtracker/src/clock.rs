// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Time sources used for request timestamps and event durations.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// Wall-clock and monotonic time for the client.
///
/// Timestamps sent to the collector come from [`Clock::now`]. Event durations
/// are measured between two [`Clock::monotonic`] readings so they are not
/// affected by wall-clock adjustments.
pub trait Clock: Send + Sync + std::fmt::Debug {
	fn now(&self) -> DateTime<Utc>;

	fn monotonic(&self) -> Instant;
}

/// The operating system clocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> DateTime<Utc> {
		Utc::now()
	}

	fn monotonic(&self) -> Instant {
		Instant::now()
	}
}

/// A clock that only moves when told to.
///
/// ```
/// use logtracker::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new(chrono::Utc::now());
/// let start = clock.monotonic();
/// clock.advance(Duration::from_millis(250));
/// assert_eq!(clock.monotonic() - start, Duration::from_millis(250));
/// ```
#[derive(Debug)]
pub struct ManualClock {
	origin: Instant,
	state: Mutex<ManualState>,
}

#[derive(Debug)]
struct ManualState {
	wall: DateTime<Utc>,
	elapsed: Duration,
}

impl ManualClock {
	pub fn new(wall: DateTime<Utc>) -> Self {
		Self {
			origin: Instant::now(),
			state: Mutex::new(ManualState {
				wall,
				elapsed: Duration::ZERO,
			}),
		}
	}

	/// Moves both the wall clock and the monotonic clock forward.
	pub fn advance(&self, by: Duration) {
		let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
		state.elapsed += by;
		if let Ok(delta) = chrono::Duration::from_std(by) {
			state.wall += delta;
		}
	}

	/// Sets the wall clock without touching the monotonic clock, like an NTP step.
	pub fn set_wall(&self, wall: DateTime<Utc>) {
		self.state.lock().unwrap_or_else(PoisonError::into_inner).wall = wall;
	}
}

impl Clock for ManualClock {
	fn now(&self) -> DateTime<Utc> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner).wall
	}

	fn monotonic(&self) -> Instant {
		self.origin + self.state.lock().unwrap_or_else(PoisonError::into_inner).elapsed
	}
}
