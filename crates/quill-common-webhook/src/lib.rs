// Copyright (c) 2026 Quill Authors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Shared HMAC-SHA256 webhook signature utilities.
//!
//! Verification goes through `Mac::verify_slice`, which compares in
//! constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the HMAC-SHA256 signature of a payload.
///
/// Returns the hex-encoded signature without any prefix.
pub fn compute_hmac_sha256(secret: &[u8], payload: &[u8]) -> String {
	let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any size");
	mac.update(payload);
	hex::encode(mac.finalize().into_bytes())
}

/// Verify the HMAC-SHA256 signature of a payload.
///
/// `signature` is the raw hex-encoded signature (no `sha256=` prefix).
/// Returns false for malformed hex rather than erroring; a signature that
/// cannot be decoded can never match.
pub fn verify_hmac_sha256(secret: &[u8], payload: &[u8], signature: &str) -> bool {
	let expected = match hex::decode(signature) {
		Ok(bytes) => bytes,
		Err(_) => return false,
	};

	let mut mac = match HmacSha256::new_from_slice(secret) {
		Ok(m) => m,
		Err(_) => return false,
	};
	mac.update(payload);
	mac.verify_slice(&expected).is_ok()
}
