// Copyright (c) 2026 Quill Authors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! HTTP boundary for the Quill review bot.
//!
//! Receives GitHub webhook deliveries, verifies their signature, and hands
//! them to the dispatch path in `quill-github-app`. Every delivery gets an
//! HTTP-level outcome: processing failures never crash the process.

pub mod policy;
pub mod routes;

use std::sync::Arc;

use quill_github_app::{GithubAppClient, ReviewPolicy};

/// Shared state for the webhook routes.
#[derive(Clone)]
pub struct AppState {
	pub github: Arc<GithubAppClient>,
	pub policy: Arc<ReviewPolicy>,
}

impl AppState {
	pub fn new(github: GithubAppClient, policy: Arc<ReviewPolicy>) -> Self {
		Self {
			github: Arc::new(github),
			policy,
		}
	}
}

/// Build the router with all routes attached.
pub fn create_router(state: AppState) -> axum::Router {
	use axum::routing::{get, post};

	axum::Router::new()
		.route("/webhooks/github", post(routes::github_webhook))
		.route("/healthz", get(routes::healthz))
		.with_state(state)
}
