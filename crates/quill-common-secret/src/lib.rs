// Copyright (c) 2026 Quill Authors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Secret wrapper type for sensitive configuration values.
//!
//! [`Secret<T>`] holds a value (private key, webhook secret, access token)
//! and replaces it with `[REDACTED]` in `Debug` and `Display` output so it
//! cannot leak through logs or error messages. The inner value is zeroized
//! when the wrapper is dropped.

use zeroize::Zeroize;

/// Placeholder emitted for secret values in `Debug`/`Display` output.
pub const REDACTED: &str = "[REDACTED]";

/// Wrapper around a sensitive value.
///
/// Access to the inner value is explicit via [`Secret::expose`], which makes
/// every use of the secret visible at the call site.
pub struct Secret<T: Zeroize>(T);

/// A secret string, the most common case.
pub type SecretString = Secret<String>;

impl<T: Zeroize> Secret<T> {
	/// Wrap a sensitive value.
	pub fn new(value: T) -> Self {
		Self(value)
	}

	/// Access the inner value.
	pub fn expose(&self) -> &T {
		&self.0
	}
}

impl<T: Zeroize + Clone> Clone for Secret<T> {
	fn clone(&self) -> Self {
		Self(self.0.clone())
	}
}

impl<T: Zeroize> Drop for Secret<T> {
	fn drop(&mut self) {
		self.0.zeroize();
	}
}

impl<T: Zeroize> std::fmt::Debug for Secret<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T: Zeroize> std::fmt::Display for Secret<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(REDACTED)
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self::new(value.to_string())
	}
}

#[cfg(feature = "serde")]
impl<'de, T: Zeroize + serde::Deserialize<'de>> serde::Deserialize<'de> for Secret<T> {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		T::deserialize(deserializer).map(Secret::new)
	}
}

#[cfg(feature = "serde")]
impl<T: Zeroize> serde::Serialize for Secret<T> {
	/// Secrets serialize as the redaction placeholder, never the value.
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(REDACTED)
	}
}
