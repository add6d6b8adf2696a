// Copyright (c) 2026 Quill Authors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Configuration for the GitHub App client.

use std::env;

use quill_common_config::{load_secret_env, SecretString};
use quill_common_http::RetryConfig;
use reqwest::Url;
use tracing::warn;

use crate::error::GithubAppError;

const DEFAULT_BASE_URL: &str = "https://api.github.com";

const ENV_APP_ID: &str = "QUILL_GITHUB_APP_ID";
const ENV_PRIVATE_KEY: &str = "QUILL_GITHUB_PRIVATE_KEY";
const ENV_WEBHOOK_SECRET: &str = "QUILL_GITHUB_WEBHOOK_SECRET";
const ENV_PERSONAL_ACCESS_TOKEN: &str = "QUILL_PERSONAL_ACCESS_TOKEN";
const ENV_BASE_URL: &str = "QUILL_GITHUB_BASE_URL";

/// Configuration for the GitHub App client.
///
/// Loaded once at process start and read-only afterwards. Sensitive fields
/// (private key, webhook secret, token override) are [`SecretString`]s so
/// they render as `[REDACTED]` in Debug output.
#[derive(Debug, Clone)]
pub struct GithubAppConfig {
	/// GitHub App numeric ID.
	app_id: u64,

	/// PEM-encoded RSA private key for JWT signing.
	private_key_pem: SecretString,

	/// When set, bypasses the JWT/installation-token exchange entirely.
	/// Used for local development and testing against a personal account.
	personal_access_token: Option<SecretString>,

	/// Secret for webhook signature verification.
	webhook_secret: Option<SecretString>,

	/// Base URL for the GitHub API (validated, parsed).
	base_url: Url,

	/// Retry behaviour for the installation token exchange.
	pub retry_config: RetryConfig,
}

impl GithubAppConfig {
	/// Validate a base URL.
	///
	/// HTTPS is required, except for loopback hosts so tests can point the
	/// client at a local mock server.
	fn validate_base_url(raw: &str) -> Result<Url, GithubAppError> {
		let url = Url::parse(raw)
			.map_err(|e| GithubAppError::Config(format!("invalid GitHub base URL '{raw}': {e}")))?;

		let host = url
			.host_str()
			.ok_or_else(|| GithubAppError::Config("GitHub base URL must include a host".to_string()))?;

		let loopback = host == "localhost" || host == "127.0.0.1" || host == "::1" || host == "[::1]";
		if url.scheme() != "https" && !loopback {
			return Err(GithubAppError::Config(format!(
				"GitHub base URL must use https, got '{}'",
				url.scheme()
			)));
		}

		Ok(url)
	}

	/// Create a configuration with the default GitHub API base URL.
	pub fn new(app_id: u64, private_key_pem: impl Into<String>) -> Self {
		Self {
			app_id,
			private_key_pem: SecretString::new(private_key_pem.into()),
			personal_access_token: None,
			webhook_secret: None,
			base_url: Url::parse(DEFAULT_BASE_URL).expect("default URL is valid"),
			retry_config: RetryConfig::default(),
		}
	}

	/// Load configuration from the environment.
	///
	/// Required:
	/// - `QUILL_GITHUB_APP_ID`: GitHub App numeric ID
	/// - `QUILL_GITHUB_PRIVATE_KEY`: PEM-encoded RSA private key (or the
	///   `_FILE` variant for a file path)
	///
	/// Optional:
	/// - `QUILL_GITHUB_WEBHOOK_SECRET` (or `_FILE`): webhook signature secret
	/// - `QUILL_PERSONAL_ACCESS_TOKEN` (or `_FILE`): token-exchange bypass
	/// - `QUILL_GITHUB_BASE_URL`: API base URL, defaults to api.github.com
	pub fn from_env() -> Result<Self, GithubAppError> {
		let app_id_str = env::var(ENV_APP_ID)
			.map_err(|_| GithubAppError::Config(format!("{ENV_APP_ID} not set")))?;
		let app_id: u64 = app_id_str
			.parse()
			.map_err(|_| GithubAppError::Config(format!("invalid {ENV_APP_ID}: {app_id_str}")))?;

		let private_key_pem = load_secret_env(ENV_PRIVATE_KEY)
			.map_err(|e| GithubAppError::Config(e.to_string()))?
			.ok_or_else(|| GithubAppError::Config(format!("{ENV_PRIVATE_KEY} not set")))?;
		if private_key_pem.expose().is_empty() {
			return Err(GithubAppError::Config(format!("{ENV_PRIVATE_KEY} is empty")));
		}

		let webhook_secret =
			load_secret_env(ENV_WEBHOOK_SECRET).map_err(|e| GithubAppError::Config(e.to_string()))?;

		let personal_access_token = load_secret_env(ENV_PERSONAL_ACCESS_TOKEN)
			.map_err(|e| GithubAppError::Config(e.to_string()))?;

		let base_url_raw = env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
		let base_url = Self::validate_base_url(&base_url_raw)?;

		Ok(Self {
			app_id,
			private_key_pem,
			personal_access_token,
			webhook_secret,
			base_url,
			retry_config: RetryConfig::default(),
		})
	}

	/// Set a custom base URL (GitHub Enterprise, or a mock server in tests).
	///
	/// If validation fails, logs a warning and keeps the previous value.
	pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
		let url_str = url.into();
		match Self::validate_base_url(&url_str) {
			Ok(validated) => self.base_url = validated,
			Err(e) => {
				warn!(error = %e, url = %url_str, "invalid base URL, keeping previous value");
			}
		}
		self
	}

	/// Set the webhook secret.
	pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
		self.webhook_secret = Some(SecretString::new(secret.into()));
		self
	}

	/// Set a personal-access-token override.
	pub fn with_personal_access_token(mut self, token: impl Into<String>) -> Self {
		self.personal_access_token = Some(SecretString::new(token.into()));
		self
	}

	/// Set a custom retry configuration for the token exchange.
	pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
		self.retry_config = config;
		self
	}

	/// The GitHub App ID.
	pub fn app_id(&self) -> u64 {
		self.app_id
	}

	/// The private key PEM (for internal JWT generation).
	pub(crate) fn private_key_pem(&self) -> &str {
		self.private_key_pem.expose()
	}

	/// The personal-access-token override, if configured.
	pub fn personal_access_token(&self) -> Option<&str> {
		self.personal_access_token
			.as_ref()
			.map(|t| t.expose().as_str())
	}

	/// The webhook secret, if configured.
	pub fn webhook_secret(&self) -> Option<&str> {
		self.webhook_secret.as_ref().map(|s| s.expose().as_str())
	}

	/// The validated API base URL.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}
}
