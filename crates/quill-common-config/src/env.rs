// Copyright (c) 2026 Quill Authors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Environment-variable helpers for secret values.
//!
//! Secrets can be provided either directly (`NAME`) or via a file path
//! (`NAME_FILE`), which is the usual shape for container secret mounts.
//! Setting both forms for the same secret is a configuration error.

use std::env;
use std::fs;

use quill_common_secret::SecretString;
use thiserror::Error;

/// Errors from loading a secret out of the environment.
#[derive(Debug, Error)]
pub enum SecretEnvError {
	/// Both `NAME` and `NAME_FILE` were set.
	#[error("both {name} and {name}_FILE are set; use only one")]
	Ambiguous { name: String },

	/// `NAME_FILE` pointed at a file that could not be read.
	#[error("failed to read {name}_FILE ({path}): {source}")]
	FileRead {
		name: String,
		path: String,
		#[source]
		source: std::io::Error,
	},

	/// A required secret was missing entirely.
	#[error("{name} is not set (set {name} or {name}_FILE)")]
	Missing { name: String },

	/// The secret was set but empty.
	#[error("{name} is empty")]
	Empty { name: String },
}

/// Load an optional secret from `name` or `name_FILE`.
///
/// Returns `Ok(None)` when neither variable is set. Trailing whitespace is
/// trimmed from file contents (secret files commonly end with a newline).
pub fn load_secret_env(name: &str) -> Result<Option<SecretString>, SecretEnvError> {
	let file_var = format!("{name}_FILE");
	let direct = env::var(name).ok();
	let from_file = env::var(&file_var).ok();

	match (direct, from_file) {
		(Some(_), Some(_)) => Err(SecretEnvError::Ambiguous {
			name: name.to_string(),
		}),
		(Some(value), None) => Ok(Some(SecretString::new(value))),
		(None, Some(path)) => {
			let contents = fs::read_to_string(&path).map_err(|source| SecretEnvError::FileRead {
				name: name.to_string(),
				path,
				source,
			})?;
			Ok(Some(SecretString::new(
				contents.trim_end_matches(['\n', '\r']).to_string(),
			)))
		}
		(None, None) => Ok(None),
	}
}

/// Load a secret that must be present and non-empty.
pub fn load_required_secret_env(name: &str) -> Result<SecretString, SecretEnvError> {
	let secret = load_secret_env(name)?.ok_or_else(|| SecretEnvError::Missing {
		name: name.to_string(),
	})?;
	if secret.expose().is_empty() {
		return Err(SecretEnvError::Empty {
			name: name.to_string(),
		});
	}
	Ok(secret)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	// Env mutation is process-global, so each test uses a unique var name.

	#[test]
	fn test_load_from_direct_var() {
		env::set_var("QUILL_TEST_SECRET_DIRECT", "s3cret");
		let secret = load_secret_env("QUILL_TEST_SECRET_DIRECT").unwrap().unwrap();
		assert_eq!(secret.expose(), "s3cret");
		env::remove_var("QUILL_TEST_SECRET_DIRECT");
	}

	#[test]
	fn test_load_from_file_var_trims_trailing_newline() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "file-s3cret").unwrap();
		env::set_var("QUILL_TEST_SECRET_FILEVAR_FILE", file.path());

		let secret = load_secret_env("QUILL_TEST_SECRET_FILEVAR")
			.unwrap()
			.unwrap();
		assert_eq!(secret.expose(), "file-s3cret");
		env::remove_var("QUILL_TEST_SECRET_FILEVAR_FILE");
	}

	#[test]
	fn test_missing_is_none() {
		let result = load_secret_env("QUILL_TEST_SECRET_UNSET").unwrap();
		assert!(result.is_none());
	}

	#[test]
	fn test_both_set_is_error() {
		env::set_var("QUILL_TEST_SECRET_BOTH", "a");
		env::set_var("QUILL_TEST_SECRET_BOTH_FILE", "/nonexistent");
		let result = load_secret_env("QUILL_TEST_SECRET_BOTH");
		assert!(matches!(result, Err(SecretEnvError::Ambiguous { .. })));
		env::remove_var("QUILL_TEST_SECRET_BOTH");
		env::remove_var("QUILL_TEST_SECRET_BOTH_FILE");
	}

	#[test]
	fn test_unreadable_file_is_error() {
		env::set_var(
			"QUILL_TEST_SECRET_BADFILE_FILE",
			"/nonexistent/path/to/secret",
		);
		let result = load_secret_env("QUILL_TEST_SECRET_BADFILE");
		assert!(matches!(result, Err(SecretEnvError::FileRead { .. })));
		env::remove_var("QUILL_TEST_SECRET_BADFILE_FILE");
	}

	#[test]
	fn test_required_missing_is_error() {
		let result = load_required_secret_env("QUILL_TEST_SECRET_REQ_UNSET");
		assert!(matches!(result, Err(SecretEnvError::Missing { .. })));
	}

	#[test]
	fn test_required_empty_is_error() {
		env::set_var("QUILL_TEST_SECRET_REQ_EMPTY", "");
		let result = load_required_secret_env("QUILL_TEST_SECRET_REQ_EMPTY");
		assert!(matches!(result, Err(SecretEnvError::Empty { .. })));
		env::remove_var("QUILL_TEST_SECRET_REQ_EMPTY");
	}
}
