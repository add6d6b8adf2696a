// Copyright (c) 2026 Quill Authors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Webhook routes.
//!
//! GitHub delivers events at-least-once and retries deliveries that fail
//! at the HTTP level, so status codes are chosen deliberately:
//!
//! - malformed payloads and bad signatures are client errors (4xx, GitHub
//!   does not usefully retry those)
//! - credential/token failures are 502 so GitHub retries the delivery
//! - review-submission failures are logged and acknowledged with 200,
//!   because a retry would risk posting a duplicate review

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, info, warn};

use quill_github_app::{
	parse_event, submit_review, verify_webhook_signature, GithubAppError, PullRequestEvent,
	WebhookEvent,
};

use crate::AppState;

const EVENT_TYPE_HEADER: &str = "x-github-event";
const SIGNATURE_HEADER: &str = "x-hub-signature-256";
const DELIVERY_ID_HEADER: &str = "x-github-delivery";

/// Acknowledgment body returned for every delivery.
#[derive(Debug, Serialize)]
struct WebhookAck {
	status: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	detail: Option<String>,
}

fn ack(status: StatusCode, outcome: &'static str, detail: Option<String>) -> Response {
	(
		status,
		Json(WebhookAck {
			status: outcome,
			detail,
		}),
	)
		.into_response()
}

/// Liveness probe.
pub async fn healthz() -> impl IntoResponse {
	StatusCode::OK
}

/// `POST /webhooks/github` — entry point for all GitHub deliveries.
pub async fn github_webhook(
	State(state): State<AppState>,
	headers: HeaderMap,
	body: Bytes,
) -> Response {
	let delivery_id = headers
		.get(DELIVERY_ID_HEADER)
		.and_then(|v| v.to_str().ok())
		.unwrap_or("unknown");

	let Some(event_type) = headers.get(EVENT_TYPE_HEADER).and_then(|v| v.to_str().ok()) else {
		return ack(
			StatusCode::BAD_REQUEST,
			"error",
			Some(format!("missing {EVENT_TYPE_HEADER} header")),
		);
	};

	// Signature check first: an unauthenticated payload gets no parsing.
	if let Some(secret) = state.github.config().webhook_secret() {
		let signature = headers
			.get(SIGNATURE_HEADER)
			.and_then(|v| v.to_str().ok())
			.unwrap_or_default();
		if verify_webhook_signature(secret, signature, &body).is_err() {
			warn!(delivery_id, "rejected delivery with invalid signature");
			return ack(
				StatusCode::UNAUTHORIZED,
				"error",
				Some("invalid webhook signature".to_string()),
			);
		}
	}

	let event = match parse_event(event_type, &body) {
		Ok(Some(WebhookEvent::PullRequest(event))) => event,
		Ok(None) => {
			info!(delivery_id, event_type, "acknowledged unsupported event");
			return ack(StatusCode::OK, "ignored", None);
		}
		Err(e) => {
			warn!(delivery_id, event_type, error = %e, "rejected malformed payload");
			return ack(StatusCode::BAD_REQUEST, "error", Some(e.to_string()));
		}
	};

	if !event.triggers_review() {
		info!(
			delivery_id,
			action = %event.action,
			"acknowledged non-triggering action"
		);
		return ack(StatusCode::OK, "ignored", None);
	}

	match handle_pull_request(&state, &event).await {
		Ok(review_id) => {
			info!(delivery_id, review_id, "review posted");
			ack(StatusCode::OK, "handled", None)
		}
		// Review-submission failures are acknowledged: GitHub cannot tell a
		// processing failure from a delivery failure, and a redelivery would
		// post a duplicate review.
		Err(e @ GithubAppError::Api { .. }) => {
			error!(delivery_id, error = %e, "review submission failed");
			ack(StatusCode::OK, "failed", Some(e.to_string()))
		}
		Err(e @ GithubAppError::Parse(_)) => {
			warn!(delivery_id, error = %e, "rejected incomplete payload");
			ack(StatusCode::BAD_REQUEST, "error", Some(e.to_string()))
		}
		// Credential or token-exchange failure: surface as a gateway error
		// so GitHub redelivers once we recover.
		Err(e) => {
			error!(delivery_id, error = %e, "failed to authenticate for delivery");
			ack(StatusCode::BAD_GATEWAY, "error", Some(e.to_string()))
		}
	}
}

/// Resolve credentials for the delivery's installation and submit a review.
async fn handle_pull_request(
	state: &AppState,
	event: &PullRequestEvent,
) -> Result<i64, GithubAppError> {
	let installation_id = match event.installation.map(|i| i.id) {
		Some(id) => id,
		// The PAT override authenticates without an installation; any id
		// works because the token broker short-circuits before the exchange.
		None if state.github.config().personal_access_token().is_some() => 0,
		None => {
			return Err(GithubAppError::Parse(
				"payload has no installation id".to_string(),
			))
		}
	};

	let api = state.github.installation_client(installation_id).await?;
	let review = submit_review(&api, event, state.policy.as_ref()).await?;
	Ok(review.id)
}
