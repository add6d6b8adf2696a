// Copyright (c) 2026 Quill Authors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Installation token broker.
//!
//! Exchanges a signed app JWT for a short-lived installation access token,
//! caching it per installation until shortly before expiry. When a
//! personal-access-token override is configured the exchange is bypassed
//! entirely.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Duration, Utc};
use quill_common_config::SecretString;
use quill_common_http::retry;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::client::GithubAppClient;
use crate::error::GithubAppError;
use crate::jwt::sign_app_jwt;

/// Media type GitHub requires for App installation endpoints.
const MACHINE_MAN_PREVIEW: &str = "application/vnd.github.machine-man-preview+json";

/// Reuse a cached token only while it has at least this long to live,
/// so a token handed out here cannot expire mid-request.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// A scoped installation access token issued by GitHub.
#[derive(Debug, Clone, Deserialize)]
pub struct InstallationToken {
	pub token: SecretString,
	pub expires_at: DateTime<Utc>,
	#[serde(skip)]
	pub installation_id: i64,
}

impl InstallationToken {
	/// Whether the token is still safe to hand out at `now`.
	pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
		now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
	}
}

/// Per-installation token cache.
///
/// Each installation gets its own async mutex slot. The slot is held across
/// a refresh, so the first caller performs the exchange and concurrent
/// callers for the same installation wait on the same in-flight refresh
/// instead of issuing duplicates. Different installations never contend.
#[derive(Default)]
pub struct TokenCache {
	slots: std::sync::Mutex<HashMap<i64, Arc<tokio::sync::Mutex<Option<InstallationToken>>>>>,
}

impl TokenCache {
	pub fn new() -> Self {
		Self::default()
	}

	fn slot(&self, installation_id: i64) -> Arc<tokio::sync::Mutex<Option<InstallationToken>>> {
		let mut slots = self.slots.lock().expect("token cache lock poisoned");
		slots.entry(installation_id).or_default().clone()
	}
}

impl GithubAppClient {
	/// Get an access token for one installation.
	///
	/// Order of preference:
	/// 1. The personal-access-token override, when configured (no network).
	/// 2. A cached installation token that is still fresh.
	/// 3. A fresh exchange: signed app JWT → installation access token.
	///
	/// The exchange goes through the shared retry helper; token issuance is
	/// idempotent, so a bounded retry on transient failure is safe.
	#[instrument(skip(self), fields(app_id = self.config().app_id()))]
	pub async fn access_token(&self, installation_id: i64) -> Result<String, GithubAppError> {
		if let Some(pat) = self.config().personal_access_token() {
			debug!("using personal access token override");
			return Ok(pat.to_string());
		}

		let slot = self.cache().slot(installation_id);
		let mut guard = slot.lock().await;

		if let Some(cached) = guard.as_ref() {
			if cached.is_fresh(Utc::now()) {
				debug!(installation_id, "reusing cached installation token");
				return Ok(cached.token.expose().clone());
			}
		}

		let fresh = retry(&self.config().retry_config, || {
			self.fetch_installation_token(installation_id)
		})
		.await?;

		let token = fresh.token.expose().clone();
		*guard = Some(fresh);
		Ok(token)
	}

	/// One JWT → installation token exchange, no caching.
	async fn fetch_installation_token(
		&self,
		installation_id: i64,
	) -> Result<InstallationToken, GithubAppError> {
		let jwt = sign_app_jwt(
			self.config().app_id(),
			self.config().private_key_pem(),
			SystemTime::now(),
		)?;

		let url = format!(
			"{}/app/installations/{installation_id}/access_tokens",
			self.config().base_url().as_str().trim_end_matches('/')
		);

		debug!(installation_id, "requesting installation access token");

		let response = self
			.http()
			.post(&url)
			.bearer_auth(jwt.token())
			.header(reqwest::header::ACCEPT, MACHINE_MAN_PREVIEW)
			.send()
			.await
			.map_err(GithubAppError::Network)?;

		let status = response.status();
		if !status.is_success() {
			// The response body may describe the rejection, but the error we
			// surface carries only ids and the status: no key material, no JWT.
			let body = response.text().await.unwrap_or_default();
			debug!(
				installation_id,
				status = status.as_u16(),
				body = %body,
				"token exchange rejected"
			);
			return Err(GithubAppError::Auth {
				app_id: self.config().app_id(),
				installation_id,
				status: status.as_u16(),
			});
		}

		let body = response.text().await.map_err(GithubAppError::Network)?;
		let mut token: InstallationToken = serde_json::from_str(&body)
			.map_err(|e| GithubAppError::Decode(format!("access token response: {e}")))?;
		token.installation_id = installation_id;

		debug!(
			installation_id,
			expires_at = %token.expires_at,
			"obtained installation access token"
		);
		Ok(token)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::GithubAppConfig;
	use quill_common_http::RetryConfig;
	use rsa::{pkcs8::EncodePrivateKey, RsaPrivateKey};
	use wiremock::matchers::{header, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn test_private_key_pem() -> String {
		let mut rng = rand::thread_rng();
		let key = RsaPrivateKey::new(&mut rng, 2048).expect("generate RSA key");
		key.to_pkcs8_pem(rsa::pkcs8::LineEnding::LF)
			.expect("encode private key")
			.to_string()
	}

	fn client_for(server: &MockServer, pem: &str) -> GithubAppClient {
		let config = GithubAppConfig::new(99, pem)
			.with_base_url(server.uri())
			.with_retry_config(RetryConfig::no_retry());
		GithubAppClient::new(config)
	}

	fn token_body(token: &str) -> serde_json::Value {
		serde_json::json!({
			"token": token,
			"expires_at": "2099-01-01T00:00:00Z"
		})
	}

	#[test]
	fn test_freshness_margin() {
		let token = InstallationToken {
			token: SecretString::new("ghs_x".to_string()),
			expires_at: Utc::now() + Duration::seconds(120),
			installation_id: 1,
		};
		assert!(token.is_fresh(Utc::now()));

		let nearly_expired = InstallationToken {
			token: SecretString::new("ghs_x".to_string()),
			expires_at: Utc::now() + Duration::seconds(30),
			installation_id: 1,
		};
		assert!(!nearly_expired.is_fresh(Utc::now()));
	}

	#[tokio::test]
	async fn test_pat_override_makes_no_network_call() {
		let server = MockServer::start().await;
		let config = GithubAppConfig::new(99, "irrelevant-key")
			.with_base_url(server.uri())
			.with_personal_access_token("ghp_local");
		let client = GithubAppClient::new(config);

		let token = client.access_token(42).await.expect("token");
		assert_eq!(token, "ghp_local");
		assert!(server.received_requests().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_exchange_sends_jwt_and_decodes_token() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/app/installations/42/access_tokens"))
			.and(header("accept", MACHINE_MAN_PREVIEW))
			.respond_with(ResponseTemplate::new(201).set_body_json(token_body("ghs_issued")))
			.expect(1)
			.mount(&server)
			.await;

		let pem = test_private_key_pem();
		let client = client_for(&server, &pem);

		let token = client.access_token(42).await.expect("token");
		assert_eq!(token, "ghs_issued");

		// The request must be bearer-authenticated with the signed JWT.
		let requests = server.received_requests().await.unwrap();
		let auth = requests[0]
			.headers
			.get("authorization")
			.expect("authorization header")
			.to_str()
			.unwrap();
		assert!(auth.starts_with("Bearer "));
	}

	#[tokio::test]
	async fn test_cached_token_is_reused() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/app/installations/42/access_tokens"))
			.respond_with(ResponseTemplate::new(201).set_body_json(token_body("ghs_cached")))
			.expect(1)
			.mount(&server)
			.await;

		let pem = test_private_key_pem();
		let client = client_for(&server, &pem);

		let first = client.access_token(42).await.expect("first");
		let second = client.access_token(42).await.expect("second");
		assert_eq!(first, second);
	}

	#[tokio::test]
	async fn test_concurrent_calls_share_one_exchange() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/app/installations/42/access_tokens"))
			.respond_with(ResponseTemplate::new(201).set_body_json(token_body("ghs_shared")))
			.expect(1)
			.mount(&server)
			.await;

		let pem = test_private_key_pem();
		let client = Arc::new(client_for(&server, &pem));

		let a = {
			let client = client.clone();
			tokio::spawn(async move { client.access_token(42).await })
		};
		let b = {
			let client = client.clone();
			tokio::spawn(async move { client.access_token(42).await })
		};

		let (a, b) = (a.await.unwrap().unwrap(), b.await.unwrap().unwrap());
		assert_eq!(a, "ghs_shared");
		assert_eq!(b, "ghs_shared");
	}

	#[tokio::test]
	async fn test_rejection_is_auth_error_with_context() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/app/installations/7/access_tokens"))
			.respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
			.mount(&server)
			.await;

		let pem = test_private_key_pem();
		let client = client_for(&server, &pem);

		let err = client.access_token(7).await.expect_err("should fail");
		match err {
			GithubAppError::Auth {
				app_id,
				installation_id,
				status,
			} => {
				assert_eq!(app_id, 99);
				assert_eq!(installation_id, 7);
				assert_eq!(status, 401);
			}
			other => panic!("expected Auth error, got {other:?}"),
		}
	}

	#[tokio::test]
	async fn test_malformed_response_is_decode_error() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/app/installations/42/access_tokens"))
			.respond_with(ResponseTemplate::new(201).set_body_string("not json"))
			.mount(&server)
			.await;

		let pem = test_private_key_pem();
		let client = client_for(&server, &pem);

		let err = client.access_token(42).await.expect_err("should fail");
		assert!(matches!(err, GithubAppError::Decode(_)));
	}

	#[tokio::test]
	async fn test_invalid_key_fails_before_any_request() {
		let server = MockServer::start().await;
		let client = client_for(&server, "not-a-pem");

		let err = client.access_token(42).await.expect_err("should fail");
		assert!(matches!(err, GithubAppError::KeyParse(_)));
		assert!(server.received_requests().await.unwrap().is_empty());
	}
}
