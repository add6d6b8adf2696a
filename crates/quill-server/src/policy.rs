// Copyright (c) 2026 Quill Authors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Default review policy.
//!
//! The policy is the pluggable business rule deciding what a review says.
//! Deployments supply their own; this default posts a short comment
//! acknowledging the pull request.

use quill_github_app::{PullRequest, ReviewDraft};

/// Comment on every reviewed pull request, addressing the author.
pub fn default_policy(pr: &PullRequest) -> ReviewDraft {
	let title = pr.title.as_deref().unwrap_or("this pull request");
	ReviewDraft::comment(format!(
		"Thanks @{}! I had a look at \"{}\" and will leave feedback here as checks complete.",
		pr.user.login, title
	))
}
