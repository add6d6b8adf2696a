// Copyright (c) 2026 Quill Authors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Quill review bot server binary.

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;

use quill_github_app::{GithubAppClient, GithubAppConfig};
use quill_server::{create_router, policy, AppState};

/// Quill - GitHub App that reviews pull requests.
#[derive(Parser, Debug)]
#[command(name = "quill-server", about = "Quill pull request review bot", version)]
struct Args {
	/// Address to bind the webhook listener to
	#[arg(long, env = "QUILL_HOST", default_value = "0.0.0.0")]
	host: String,

	/// Port to bind the webhook listener to
	#[arg(long, env = "QUILL_PORT", default_value_t = 8000)]
	port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	// Load .env file if present
	dotenvy::dotenv().ok();

	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| "info".into()),
		)
		.init();

	// Credentials are mandatory; refuse to start without them rather than
	// reject every delivery at runtime.
	let config = GithubAppConfig::from_env().context("loading GitHub App configuration")?;

	tracing::info!(
		app_id = config.app_id(),
		base_url = %config.base_url(),
		webhook_signature_enforced = config.webhook_secret().is_some(),
		pat_override = config.personal_access_token().is_some(),
		"starting quill-server"
	);
	if config.webhook_secret().is_none() {
		tracing::warn!("no webhook secret configured, accepting unsigned deliveries");
	}

	let state = AppState::new(
		GithubAppClient::new(config),
		Arc::new(policy::default_policy),
	);
	let app = create_router(state);

	let addr = format!("{}:{}", args.host, args.port);
	tracing::info!("listening on {}", addr);
	let listener = tokio::net::TcpListener::bind(&addr)
		.await
		.with_context(|| format!("binding {addr}"))?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("received shutdown signal");
		}
	}

	tracing::info!("server shutdown complete");
	Ok(())
}
