// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Free-form metadata attached to sessions and events.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// An open JSON object attached to a session or event.
///
/// Keys are strings; values are any JSON value, nested arbitrarily. The
/// collector stores the object verbatim.
///
/// # Example
///
/// ```
/// use logtracker_core::Metadata;
///
/// let metadata = Metadata::new()
///     .insert("route", "/v1/orders")
///     .insert("attempt", 2)
///     .insert("cached", false);
///
/// assert_eq!(metadata.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
	fields: Map<String, Value>,
}

impl Metadata {
	pub fn new() -> Self {
		Self { fields: Map::new() }
	}

	/// Adds a field, replacing any previous value under the same key.
	pub fn insert<K, V>(mut self, key: K, value: V) -> Self
	where
		K: Into<String>,
		V: Into<Value>,
	{
		self.fields.insert(key.into(), value.into());
		self
	}

	/// Merges `other` into this metadata. Keys present in both take the value from `other`.
	pub fn merge(mut self, other: Metadata) -> Self {
		self.fields.extend(other.fields);
		self
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.fields.get(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.fields.contains_key(key)
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	pub fn len(&self) -> usize {
		self.fields.len()
	}

	pub fn into_value(self) -> Value {
		Value::Object(self.fields)
	}
}

impl From<Metadata> for Value {
	fn from(metadata: Metadata) -> Self {
		metadata.into_value()
	}
}

impl TryFrom<Value> for Metadata {
	type Error = CoreError;

	fn try_from(value: Value) -> Result<Self, Self::Error> {
		let kind = match value {
			Value::Object(fields) => return Ok(Self { fields }),
			Value::Null => "null",
			Value::Bool(_) => "a boolean",
			Value::Number(_) => "a number",
			Value::String(_) => "a string",
			Value::Array(_) => "an array",
		};
		Err(CoreError::InvalidMetadata(kind))
	}
}

impl From<Map<String, Value>> for Metadata {
	fn from(fields: Map<String, Value>) -> Self {
		Self { fields }
	}
}
