// Copyright (c) 2026 Quill Authors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! GitHub API client factory.
//!
//! [`GithubAppClient`] owns the app credential, the shared HTTP client and
//! the installation token cache for the lifetime of the process.
//! [`InstallationClient`] is the per-installation product: a REST client
//! bound to one installation's token. Building one per delivery is cheap;
//! there is no shared mutable state between them.

use std::time::Duration;

use async_trait::async_trait;
use quill_common_config::SecretString;
use reqwest::{header, Client, Url};
use tracing::{debug, instrument};

use crate::config::GithubAppConfig;
use crate::error::GithubAppError;
use crate::review::{PullRequestApi, Review, ReviewRequest};
use crate::token::TokenCache;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const GITHUB_JSON: &str = "application/vnd.github.v3+json";

/// Long-lived GitHub App client.
pub struct GithubAppClient {
	config: GithubAppConfig,
	http: Client,
	cache: TokenCache,
}

impl GithubAppClient {
	/// Create a client from a validated configuration.
	pub fn new(config: GithubAppConfig) -> Self {
		let http = quill_common_http::builder()
			.timeout(REQUEST_TIMEOUT)
			.build()
			.expect("failed to build HTTP client");

		Self {
			config,
			http,
			cache: TokenCache::new(),
		}
	}

	pub fn config(&self) -> &GithubAppConfig {
		&self.config
	}

	pub(crate) fn http(&self) -> &Client {
		&self.http
	}

	pub(crate) fn cache(&self) -> &TokenCache {
		&self.cache
	}

	/// Build a REST client authenticated for one installation.
	///
	/// Resolves an access token (cache, override, or fresh exchange) and
	/// binds it to a new [`InstallationClient`].
	#[instrument(skip(self))]
	pub async fn installation_client(
		&self,
		installation_id: i64,
	) -> Result<InstallationClient, GithubAppError> {
		let token = self.access_token(installation_id).await?;
		debug!(installation_id, "built installation client");
		Ok(InstallationClient::new(
			self.http.clone(),
			self.config.base_url().clone(),
			token,
		))
	}

	/// A default, unauthenticated client.
	///
	/// For capability probing only; authenticated writes always go through
	/// [`InstallationClient`].
	pub fn unauthenticated() -> Client {
		quill_common_http::new_client()
	}
}

/// REST client bound to one installation's access token.
pub struct InstallationClient {
	http: Client,
	base_url: Url,
	token: SecretString,
}

impl InstallationClient {
	pub fn new(http: Client, base_url: Url, token: String) -> Self {
		Self {
			http,
			base_url,
			token: SecretString::new(token),
		}
	}

	fn endpoint(&self, path: &str) -> String {
		format!("{}/{path}", self.base_url.as_str().trim_end_matches('/'))
	}
}

#[async_trait]
impl PullRequestApi for InstallationClient {
	/// `POST /repos/{owner}/{repo}/pulls/{number}/reviews`
	#[instrument(skip(self, review), fields(
		owner = %review.owner,
		repo = %review.repo,
		number = review.number,
	))]
	async fn create_review(&self, review: &ReviewRequest) -> Result<Review, GithubAppError> {
		let url = self.endpoint(&format!(
			"repos/{}/{}/pulls/{}/reviews",
			urlencoding::encode(&review.owner),
			urlencoding::encode(&review.repo),
			review.number
		));

		let response = self
			.http
			.post(&url)
			.bearer_auth(self.token.expose())
			.header(header::ACCEPT, GITHUB_JSON)
			.json(review)
			.send()
			.await
			.map_err(GithubAppError::Network)?;

		let status = response.status();
		if !status.is_success() {
			let message = response.text().await.unwrap_or_default();
			return Err(GithubAppError::api_error(
				review.owner.clone(),
				review.repo.clone(),
				review.number,
				status.as_u16(),
				message,
			));
		}

		response
			.json::<Review>()
			.await
			.map_err(|e| GithubAppError::Decode(format!("review response: {e}")))
	}
}
