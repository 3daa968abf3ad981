// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use logtracker::{EventType, Metadata, SessionKind, TrackerConfig};
use serde_json::Value;

/// LogTracker - record sessions and backend events from the command line
#[derive(Parser, Debug)]
#[command(name = "logtracker", version, about, long_about = None)]
pub struct Args {
	/// Path to custom configuration file
	#[arg(short, long, global = true)]
	pub config: Option<PathBuf>,

	/// Output logs as JSON
	#[arg(long, global = true)]
	pub json_logs: bool,

	/// Collector base URL
	#[arg(long, global = true, env = "LOGTRACKER_URL")]
	pub url: Option<String>,

	/// Application identifier
	#[arg(long, global = true, env = "LOGTRACKER_APPLICATION_ID")]
	pub application_id: Option<String>,

	/// Public key for the application
	#[arg(long, global = true, env = "LOGTRACKER_PUBLIC_KEY", hide_env_values = true)]
	pub public_key: Option<String>,

	/// Route prefix before /track (use "" for collectors serving at the root)
	#[arg(long, global = true, env = "LOGTRACKER_PATH_PREFIX")]
	pub path_prefix: Option<String>,

	#[command(subcommand)]
	pub command: Command,
}

impl Args {
	/// Flag values as a config layer to merge over file and environment settings.
	pub fn overrides(&self) -> TrackerConfig {
		TrackerConfig {
			url: self.url.clone(),
			application_id: self.application_id.clone(),
			public_key: self.public_key.clone(),
			path_prefix: self.path_prefix.clone(),
			request_timeout_secs: None,
		}
	}
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Open and close sessions
	Session {
		#[command(subcommand)]
		command: SessionCommand,
	},
	/// Record backend events
	Event {
		#[command(subcommand)]
		command: EventCommand,
	},
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
	/// Start a session and remember its id for `session end`
	Start {
		/// pre-authentication, authenticated, or refresh-authentication
		#[arg(long)]
		kind: SessionKind,

		/// User identifier
		#[arg(long)]
		user: String,

		/// Id of a related session or event
		#[arg(long)]
		link_id: Option<String>,

		/// JSON object attached to the session
		#[arg(long, value_parser = parse_metadata)]
		metadata: Option<Metadata>,

		/// Minutes until the collector expires the session
		#[arg(long, default_value_t = 30)]
		timeout: u32,
	},
	/// End a session (the stored one if no id is given)
	End {
		#[arg(long)]
		session_id: Option<String>,
	},
}

#[derive(Subcommand, Debug)]
pub enum EventCommand {
	/// Record an error-category event
	Error(PointEventArgs),
	/// Record a success-category event
	Success(PointEventArgs),
	/// List event types and their categories
	Types,
}

#[derive(clap::Args, Debug)]
pub struct PointEventArgs {
	/// Event type, e.g. api_error or auth_success
	#[arg(long = "type")]
	pub event_type: EventType,

	/// Session the event belongs to (defaults to the stored session)
	#[arg(long)]
	pub session_id: Option<String>,

	#[arg(long)]
	pub link_id: Option<String>,

	/// JSON object attached to the event
	#[arg(long, value_parser = parse_metadata)]
	pub metadata: Option<Metadata>,
}

fn parse_metadata(raw: &str) -> Result<Metadata, String> {
	let value: Value = serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {e}"))?;
	Metadata::try_from(value).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;

	#[test]
	fn test_command_definition_is_valid() {
		Args::command().debug_assert();
	}

	#[test]
	fn test_parse_session_start() {
		let args = Args::try_parse_from([
			"logtracker",
			"session",
			"start",
			"--kind",
			"authenticated",
			"--user",
			"user-42",
			"--timeout",
			"10",
			"--metadata",
			r#"{"plan":"pro"}"#,
		])
		.unwrap();

		match args.command {
			Command::Session {
				command:
					SessionCommand::Start {
						kind,
						user,
						link_id,
						metadata,
						timeout,
					},
			} => {
				assert_eq!(kind, SessionKind::Authenticated);
				assert_eq!(user, "user-42");
				assert!(link_id.is_none());
				assert_eq!(metadata.unwrap().get("plan").unwrap(), "pro");
				assert_eq!(timeout, 10);
			}
			other => panic!("unexpected command: {other:?}"),
		}
	}

	#[test]
	fn test_parse_rejects_unknown_session_kind() {
		let result = Args::try_parse_from([
			"logtracker",
			"session",
			"start",
			"--kind",
			"guest",
			"--user",
			"u",
		]);
		assert!(result.is_err());
	}

	#[test]
	fn test_parse_event_error() {
		let args = Args::try_parse_from([
			"logtracker",
			"event",
			"error",
			"--type",
			"api_error",
			"--session-id",
			"S1",
		])
		.unwrap();

		match args.command {
			Command::Event {
				command: EventCommand::Error(event),
			} => {
				assert_eq!(event.event_type, EventType::ApiError);
				assert_eq!(event.session_id.as_deref(), Some("S1"));
			}
			other => panic!("unexpected command: {other:?}"),
		}
	}

	#[test]
	fn test_global_flags_after_subcommand() {
		let args = Args::try_parse_from([
			"logtracker",
			"session",
			"end",
			"--url",
			"https://collector.example.com",
			"--path-prefix",
			"",
		])
		.unwrap();

		let overrides = args.overrides();
		assert_eq!(overrides.url.as_deref(), Some("https://collector.example.com"));
		assert_eq!(overrides.path_prefix.as_deref(), Some(""));
	}

	#[test]
	fn test_parse_metadata_requires_object() {
		assert!(parse_metadata(r#"{"a":1}"#).is_ok());
		assert!(parse_metadata("[1,2]").unwrap_err().contains("an array"));
		assert!(parse_metadata("{not json").is_err());
	}
}
