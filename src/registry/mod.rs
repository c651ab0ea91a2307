//! Issue registry abstraction.
//!
//! The registry is the only durable state of the initializer: every comment
//! thread is an issue labelled `[kind, fingerprint]`. The registry itself
//! does not deduplicate; callers reconcile before creating.

pub mod github;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Issue, NewIssue};

// Re-export for convenience
pub use github::GithubRegistry;

/// Backend that stores comment-thread issues.
#[async_trait]
pub trait IssueRegistry: Send + Sync {
    /// List every issue of the backing repository (pull requests excluded).
    async fn list_issues(&self) -> Result<Vec<Issue>>;

    /// Create a new issue.
    async fn create_issue(&self, issue: &NewIssue) -> Result<Issue>;
}
