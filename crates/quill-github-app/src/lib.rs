// Copyright (c) 2026 Quill Authors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! GitHub App authentication and pull-request review client for Quill.
//!
//! This crate turns a raw webhook payload into an authenticated API call
//! that posts a review:
//!
//! - [`events`]: parse a delivery into a typed [`WebhookEvent`]
//! - [`jwt`] + [`token`]: signed app JWT → cached installation token
//! - [`client`]: REST clients bound to one installation's token
//! - [`review`]: run the pluggable policy and submit exactly one review
//! - [`webhook`]: HMAC signature verification for inbound deliveries

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod jwt;
pub mod review;
pub mod token;
pub mod webhook;

pub use client::{GithubAppClient, InstallationClient};
pub use config::GithubAppConfig;
pub use error::GithubAppError;
pub use events::{parse_event, PullRequest, PullRequestEvent, WebhookEvent, PULL_REQUEST_EVENT};
pub use quill_common_http::RetryConfig;
pub use review::{
	submit_review, PullRequestApi, Review, ReviewDraft, ReviewEvent, ReviewPolicy, ReviewRequest,
};
pub use token::{InstallationToken, TokenCache};
pub use webhook::{compute_webhook_signature, verify_webhook_signature};
