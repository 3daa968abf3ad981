// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod cli;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use logtracker::{
	EventOptions, EventType, FileSessionStore, SessionId, SessionOptions, TrackerClient,
	TrackerClientBuilder, TrackerConfig,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Args, Command, EventCommand, PointEventArgs, SessionCommand};

/// Logs go to stderr; stdout carries only ids and listings.
fn init_tracing(json_logs: bool) {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("logtracker=info"));

	if json_logs {
		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().json().with_writer(std::io::stderr))
			.init();
	} else {
		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().compact().with_writer(std::io::stderr))
			.init();
	}
}

/// Loads file and environment settings, applies flag overrides, and builds a
/// client that keeps the current session id on disk.
fn connect(args: &Args) -> Result<TrackerClient> {
	let config = TrackerConfig::load(args.config.as_deref())
		.context("failed to load configuration")?
		.merge(args.overrides());

	let store = FileSessionStore::default_location().context("no state directory for sessions")?;
	tracing::debug!(dir = %store.dir().display(), "using file session store");

	TrackerClientBuilder::from_config(&config)
		.context("incomplete configuration")?
		.session_store(store)
		.build()
		.context("failed to create tracker client")
}

fn print_event_types() {
	for event_type in EventType::ALL {
		println!("{:<18} {}", event_type.as_str(), event_type.category());
	}
}

async fn resolve_session(client: &TrackerClient, explicit: Option<String>) -> Result<SessionId> {
	match explicit {
		Some(id) => Ok(SessionId::new(id)),
		None => client
			.stored_session_id()
			.await?
			.ok_or_else(|| anyhow!("no stored session; pass --session-id")),
	}
}

fn event_options(event: &PointEventArgs) -> EventOptions {
	EventOptions {
		link_id: event.link_id.clone(),
		metadata: event.metadata.clone(),
	}
}

async fn run_session(args: &Args, command: &SessionCommand) -> Result<()> {
	let client = connect(args)?;

	match command {
		SessionCommand::Start {
			kind,
			user,
			link_id,
			metadata,
			timeout,
		} => {
			let options = SessionOptions {
				link_id: link_id.clone(),
				metadata: metadata.clone(),
				..SessionOptions::default()
			}
			.timeout_minutes(*timeout)?;
			let session_id = client
				.start_session(*kind, user, options)
				.await
				.context("failed to start session")?;
			println!("{session_id}");
		}
		SessionCommand::End { session_id: Some(id) } => {
			let session_id = SessionId::new(id.as_str());
			client
				.end_session(&session_id)
				.await
				.context("failed to end session")?;
			println!("{session_id}");
		}
		SessionCommand::End { session_id: None } => {
			let session_id = client
				.end_stored_session()
				.await
				.context("failed to end stored session")?;
			println!("{session_id}");
		}
	}
	Ok(())
}

async fn run_event(args: &Args, command: &EventCommand) -> Result<()> {
	let event_id = match command {
		EventCommand::Types => {
			print_event_types();
			return Ok(());
		}
		EventCommand::Error(event) => {
			let client = connect(args)?;
			let session_id = resolve_session(&client, event.session_id.clone()).await?;
			client
				.end_backend_error_event(event.event_type, &session_id, event_options(event))
				.await
				.context("failed to record error event")?
		}
		EventCommand::Success(event) => {
			let client = connect(args)?;
			let session_id = resolve_session(&client, event.session_id.clone()).await?;
			client
				.end_backend_success_event(event.event_type, &session_id, event_options(event))
				.await
				.context("failed to record success event")?
		}
	};
	println!("{event_id}");
	Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();
	init_tracing(args.json_logs);

	match &args.command {
		Command::Session { command } => run_session(&args, command).await,
		Command::Event { command } => run_event(&args, command).await,
	}
}
