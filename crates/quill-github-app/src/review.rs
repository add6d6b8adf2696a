// Copyright (c) 2026 Quill Authors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Review action executor.
//!
//! Turns a parsed pull-request event into exactly one review submission.
//! The text and review kind come from a pluggable policy function; this
//! module owns only the mechanics of submitting the result.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::GithubAppError;
use crate::events::{PullRequest, PullRequestEvent};

/// The kind of review to submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewEvent {
	#[serde(rename = "COMMENT")]
	Comment,
	#[serde(rename = "APPROVE")]
	Approve,
	#[serde(rename = "REQUEST_CHANGES")]
	RequestChanges,
}

/// A review to be submitted against one pull request.
///
/// `owner`/`repo`/`number` address the pull request; only `body` and
/// `event` go on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewRequest {
	#[serde(skip)]
	pub owner: String,
	#[serde(skip)]
	pub repo: String,
	#[serde(skip)]
	pub number: u64,
	pub body: String,
	pub event: ReviewEvent,
}

/// A submitted review, as returned by GitHub.
#[derive(Debug, Clone, Deserialize)]
pub struct Review {
	pub id: i64,
}

/// What the policy decided to post.
#[derive(Debug, Clone)]
pub struct ReviewDraft {
	pub body: String,
	pub event: ReviewEvent,
}

impl ReviewDraft {
	/// A plain comment review.
	pub fn comment(body: impl Into<String>) -> Self {
		Self {
			body: body.into(),
			event: ReviewEvent::Comment,
		}
	}
}

/// Business policy deciding what to post for a pull request.
///
/// External collaborator: the core never inspects the draft beyond
/// submitting it.
pub type ReviewPolicy = dyn Fn(&PullRequest) -> ReviewDraft + Send + Sync;

/// The slice of the GitHub API the executor needs.
///
/// The production implementation is `InstallationClient`; tests substitute
/// a mock.
#[async_trait]
pub trait PullRequestApi: Send + Sync {
	async fn create_review(&self, review: &ReviewRequest) -> Result<Review, GithubAppError>;
}

/// Run the policy and submit the resulting review.
///
/// Submits exactly once per invocation. Not idempotent: a webhook delivery
/// processed twice posts twice; de-duplication is a caller concern. API
/// failures come back as [`GithubAppError::Api`] with the owner/repo/number
/// embedded, and are never auto-retried here.
#[instrument(skip(api, policy), fields(
	owner = %event.repository.owner.login,
	repo = %event.repository.name,
	number = event.pull_request.number,
))]
pub async fn submit_review(
	api: &dyn PullRequestApi,
	event: &PullRequestEvent,
	policy: &ReviewPolicy,
) -> Result<Review, GithubAppError> {
	let draft = policy(&event.pull_request);
	let request = ReviewRequest {
		owner: event.repository.owner.login.clone(),
		repo: event.repository.name.clone(),
		number: event.pull_request.number,
		body: draft.body,
		event: draft.event,
	};

	let review = api.create_review(&request).await?;
	info!(review_id = review.id, "review submitted");
	Ok(review)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::events::{fixtures::SAMPLE_PAYLOAD, parse_event, WebhookEvent, PULL_REQUEST_EVENT};
	use std::sync::Mutex;

	/// Records every submission and answers with a fixed review.
	struct MockApi {
		calls: Mutex<Vec<ReviewRequest>>,
		response: Result<i64, (u16, String)>,
	}

	impl MockApi {
		fn returning_review(id: i64) -> Self {
			Self {
				calls: Mutex::new(Vec::new()),
				response: Ok(id),
			}
		}

		fn failing(status: u16, message: &str) -> Self {
			Self {
				calls: Mutex::new(Vec::new()),
				response: Err((status, message.to_string())),
			}
		}
	}

	#[async_trait]
	impl PullRequestApi for MockApi {
		async fn create_review(&self, review: &ReviewRequest) -> Result<Review, GithubAppError> {
			self.calls.lock().unwrap().push(review.clone());
			match &self.response {
				Ok(id) => Ok(Review { id: *id }),
				Err((status, message)) => Err(GithubAppError::api_error(
					review.owner.clone(),
					review.repo.clone(),
					review.number,
					*status,
					message.clone(),
				)),
			}
		}
	}

	fn sample_event() -> PullRequestEvent {
		let WebhookEvent::PullRequest(event) = parse_event(PULL_REQUEST_EVENT, SAMPLE_PAYLOAD.as_bytes())
			.unwrap()
			.unwrap();
		event
	}

	#[tokio::test]
	async fn test_sample_payload_posts_exactly_one_comment() {
		let api = MockApi::returning_review(1);
		let event = sample_event();
		let policy = |_pr: &PullRequest| ReviewDraft::comment("test");

		let review = submit_review(&api, &event, &policy).await.expect("submit");
		assert_eq!(review.id, 1);

		let calls = api.calls.lock().unwrap();
		assert_eq!(calls.len(), 1);
		assert_eq!(calls[0].owner, "Spazzy757");
		assert_eq!(calls[0].repo, "paul");
		assert_eq!(calls[0].number, 1);
		assert_eq!(calls[0].body, "test");
		assert_eq!(calls[0].event, ReviewEvent::Comment);
	}

	#[tokio::test]
	async fn test_policy_output_is_submitted_verbatim() {
		let api = MockApi::returning_review(7);
		let event = sample_event();
		let policy = |pr: &PullRequest| ReviewDraft {
			body: format!("pr #{} by {}", pr.number, pr.user.login),
			event: ReviewEvent::Approve,
		};

		submit_review(&api, &event, &policy).await.expect("submit");

		let calls = api.calls.lock().unwrap();
		assert_eq!(calls[0].body, "pr #1 by Spazzy757");
		assert_eq!(calls[0].event, ReviewEvent::Approve);
	}

	#[tokio::test]
	async fn test_api_failure_carries_context_and_is_not_retried() {
		let api = MockApi::failing(403, "Resource not accessible by integration");
		let event = sample_event();
		let policy = |_pr: &PullRequest| ReviewDraft::comment("test");

		let err = submit_review(&api, &event, &policy)
			.await
			.expect_err("should fail");
		match err {
			GithubAppError::Api {
				owner,
				repo,
				number,
				status,
				..
			} => {
				assert_eq!(owner, "Spazzy757");
				assert_eq!(repo, "paul");
				assert_eq!(number, 1);
				assert_eq!(status, 403);
			}
			other => panic!("expected Api error, got {other:?}"),
		}

		// Exactly one attempt even on failure.
		assert_eq!(api.calls.lock().unwrap().len(), 1);
	}

	#[test]
	fn test_review_request_wire_format() {
		let request = ReviewRequest {
			owner: "Spazzy757".to_string(),
			repo: "paul".to_string(),
			number: 1,
			body: "test".to_string(),
			event: ReviewEvent::RequestChanges,
		};
		let wire = serde_json::to_value(&request).unwrap();
		assert_eq!(
			wire,
			serde_json::json!({ "body": "test", "event": "REQUEST_CHANGES" })
		);
	}
}
