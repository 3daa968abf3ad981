// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wire format for instants sent to the collector.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serializer;

/// Formats an instant as ISO-8601 UTC with millisecond precision, e.g.
/// `2025-01-31T09:15:00.250Z`.
pub fn format(instant: &DateTime<Utc>) -> String {
	instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `serialize_with` adapter for [`format`].
pub fn serialize<S>(instant: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	serializer.serialize_str(&format(instant))
}
