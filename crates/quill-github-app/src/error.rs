// Copyright (c) 2026 Quill Authors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the GitHub App client.
//!
//! The enum is closed so the HTTP boundary can branch on kind: parse
//! failures become client errors, token-exchange failures let GitHub retry
//! the delivery, and review-submission failures are logged and acknowledged.
//! Variants carry structured context (app id, installation id, owner/repo/
//! number) and never embed key material or signed tokens.

use quill_common_http::RetryableError;
use thiserror::Error;

/// Errors that can occur when authenticating as a GitHub App or calling the
/// GitHub API.
#[derive(Debug, Error)]
pub enum GithubAppError {
	/// The PEM-encoded RSA private key could not be parsed.
	#[error("invalid RSA private key: {0}")]
	KeyParse(String),

	/// JWT construction or signing failed.
	#[error("JWT signing failed: {0}")]
	Signing(String),

	/// The installation token exchange was rejected by GitHub.
	#[error("token exchange failed for app {app_id}, installation {installation_id}: HTTP {status}")]
	Auth {
		app_id: u64,
		installation_id: i64,
		status: u16,
	},

	/// Network-level error during HTTP communication.
	#[error("network error: {0}")]
	Network(#[from] reqwest::Error),

	/// A response from GitHub could not be decoded.
	#[error("invalid response from GitHub: {0}")]
	Decode(String),

	/// A webhook payload was malformed or missing mandatory fields.
	#[error("malformed webhook payload: {0}")]
	Parse(String),

	/// Review submission failed.
	#[error("review submission failed for {owner}/{repo}#{number}: HTTP {status} - {message}")]
	Api {
		owner: String,
		repo: String,
		number: u64,
		status: u16,
		message: String,
	},

	/// Configuration error (missing or invalid settings at startup).
	#[error("configuration error: {0}")]
	Config(String),

	/// Webhook signature verification failed.
	#[error("invalid webhook signature")]
	InvalidWebhookSignature,
}

impl GithubAppError {
	/// Create an API error with the pull request it was aimed at.
	pub fn api_error(
		owner: impl Into<String>,
		repo: impl Into<String>,
		number: u64,
		status: u16,
		message: impl Into<String>,
	) -> Self {
		Self::Api {
			owner: owner.into(),
			repo: repo.into(),
			number,
			status,
			message: message.into(),
		}
	}
}

impl RetryableError for GithubAppError {
	fn is_retryable(&self) -> bool {
		match self {
			GithubAppError::Network(e) => e.is_retryable(),
			GithubAppError::Auth { status, .. } => *status >= 500,
			// Classification only; review submission is never auto-retried
			// because deliveries are at-least-once and reviews are not
			// de-duplicated.
			GithubAppError::Api { status, .. } => *status >= 500,
			_ => false,
		}
	}
}
