// Copyright (c) 2026 Quill Authors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Webhook event parsing and dispatch.
//!
//! The event kind comes from the `X-GitHub-Event` header; the body is
//! parsed against the schema for that kind. Supported kinds form a closed
//! enum; anything else is a no-op so the HTTP boundary can still
//! acknowledge the delivery.

use serde::Deserialize;

use crate::error::GithubAppError;

/// Header value GitHub sends for pull-request events.
pub const PULL_REQUEST_EVENT: &str = "pull_request";

/// A GitHub account (user or organization), reduced to what we act on.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
	pub login: String,
}

/// One side of a pull request (head or base).
#[derive(Debug, Clone, Deserialize)]
pub struct GitRef {
	#[serde(rename = "ref")]
	pub git_ref: String,
	pub sha: String,
}

/// The pull request embedded in a webhook payload.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
	pub id: i64,
	pub number: u64,
	#[serde(default)]
	pub title: Option<String>,
	pub user: Account,
	pub head: GitRef,
	pub base: GitRef,
}

/// The repository a webhook payload refers to.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
	pub name: String,
	pub owner: Account,
	#[serde(default)]
	pub full_name: Option<String>,
}

/// The App installation a delivery originates from.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct InstallationRef {
	pub id: i64,
}

/// A `pull_request` webhook payload.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
	pub action: String,
	pub pull_request: PullRequest,
	pub repository: Repository,
	#[serde(default)]
	pub installation: Option<InstallationRef>,
}

impl PullRequestEvent {
	/// Whether this action should produce a review.
	///
	/// Only newly opened pull requests and new pushes to existing ones
	/// trigger a review; every other action (closed, labeled, ...) is
	/// acknowledged as a no-op.
	pub fn triggers_review(&self) -> bool {
		matches!(self.action.as_str(), "opened" | "synchronize")
	}
}

/// Supported webhook event kinds.
#[derive(Debug, Clone)]
pub enum WebhookEvent {
	PullRequest(PullRequestEvent),
}

/// Parse a raw webhook body according to its declared event type.
///
/// Returns `Ok(None)` for event kinds outside the supported set: those are
/// deliberately a no-op, not an error, so the caller acknowledges receipt
/// and GitHub does not retry. Malformed JSON or a payload missing
/// mandatory fields is a [`GithubAppError::Parse`], which the HTTP
/// boundary reports as a client error.
pub fn parse_event(event_type: &str, body: &[u8]) -> Result<Option<WebhookEvent>, GithubAppError> {
	match event_type {
		PULL_REQUEST_EVENT => {
			let event: PullRequestEvent = serde_json::from_slice(body)
				.map_err(|e| GithubAppError::Parse(format!("pull_request payload: {e}")))?;

			if event.pull_request.number == 0 {
				return Err(GithubAppError::Parse(
					"pull request number must be positive".to_string(),
				));
			}
			if event.repository.owner.login.is_empty() || event.repository.name.is_empty() {
				return Err(GithubAppError::Parse(
					"repository owner and name are required".to_string(),
				));
			}

			Ok(Some(WebhookEvent::PullRequest(event)))
		}
		_ => {
			tracing::debug!(event_type = event_type, "ignoring unsupported event type");
			Ok(None)
		}
	}
}
