// Copyright (c) 2026 Quill Authors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Shared HTTP utilities for Quill.
//!
//! This crate provides:
//! - A pre-configured HTTP client with a consistent User-Agent header
//! - Bounded retry with exponential backoff for transient failures

mod client;
mod retry;

pub use client::{builder, new_client, new_client_with_timeout, user_agent};
pub use retry::{retry, RetryConfig, RetryableError};
