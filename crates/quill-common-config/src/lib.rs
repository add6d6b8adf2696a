// Copyright (c) 2026 Quill Authors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Common configuration primitives for Quill.
//!
//! This crate provides shared helpers for configuration across the Quill
//! workspace:
//!
//! - [`Secret<T>`]: a wrapper type that prevents accidental logging of
//!   sensitive values (re-exported from [`quill_common_secret`])
//! - [`load_secret_env`]: loading secrets from environment variables with
//!   `*_FILE` support for file-mounted secrets

pub mod env;

pub use quill_common_secret::{Secret, SecretString, REDACTED};

pub use env::{load_required_secret_env, load_secret_env, SecretEnvError};
