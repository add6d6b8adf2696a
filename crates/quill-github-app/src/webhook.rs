// Copyright (c) 2026 Quill Authors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Webhook signature verification.

use tracing::warn;

use crate::error::GithubAppError;

const SIGNATURE_PREFIX: &str = "sha256=";

/// Verify a GitHub webhook signature.
///
/// GitHub sends an `X-Hub-Signature-256` header containing an HMAC-SHA256
/// signature of the raw request body, keyed with the webhook secret and
/// formatted as `sha256=<hex>`.
pub fn verify_webhook_signature(
	secret: &str,
	signature_header: &str,
	body: &[u8],
) -> Result<(), GithubAppError> {
	let expected_hex = signature_header
		.strip_prefix(SIGNATURE_PREFIX)
		.ok_or_else(|| {
			warn!("webhook signature header missing 'sha256=' prefix");
			GithubAppError::InvalidWebhookSignature
		})?;

	if quill_common_webhook::verify_hmac_sha256(secret.as_bytes(), body, expected_hex) {
		Ok(())
	} else {
		warn!("webhook signature verification failed");
		Err(GithubAppError::InvalidWebhookSignature)
	}
}

/// Compute the header value for a payload, `sha256=<hex>`.
///
/// Used by tests and by tools that replay deliveries.
pub fn compute_webhook_signature(secret: &str, body: &[u8]) -> String {
	format!(
		"{SIGNATURE_PREFIX}{}",
		quill_common_webhook::compute_hmac_sha256(secret.as_bytes(), body)
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	const SECRET: &str = "webhook-secret";
	const BODY: &[u8] = b"{\"action\":\"opened\"}";

	#[test]
	fn test_valid_signature_verifies() {
		let signature = compute_webhook_signature(SECRET, BODY);
		assert!(verify_webhook_signature(SECRET, &signature, BODY).is_ok());
	}

	#[test]
	fn test_missing_prefix_fails() {
		let result = verify_webhook_signature(SECRET, "sha1=abc123", BODY);
		assert!(matches!(
			result,
			Err(GithubAppError::InvalidWebhookSignature)
		));
	}

	#[test]
	fn test_wrong_signature_fails() {
		let header = format!("sha256={}", "0".repeat(64));
		let result = verify_webhook_signature(SECRET, &header, BODY);
		assert!(matches!(
			result,
			Err(GithubAppError::InvalidWebhookSignature)
		));
	}

	#[test]
	fn test_tampered_body_fails() {
		let signature = compute_webhook_signature(SECRET, BODY);
		let result = verify_webhook_signature(SECRET, &signature, b"{\"action\":\"closed\"}");
		assert!(result.is_err());
	}

	#[test]
	fn test_wrong_secret_fails() {
		let signature = compute_webhook_signature(SECRET, BODY);
		let result = verify_webhook_signature("other-secret", &signature, BODY);
		assert!(result.is_err());
	}
}
