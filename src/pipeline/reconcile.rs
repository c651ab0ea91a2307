//! Reconciliation of sitemap pages against existing thread issues.
//!
//! A page is initialized when some issue's fingerprint label matches the
//! page's fingerprint. With [`MatchPolicy::Substring`] the label only has to
//! contain the fingerprint, which tolerates decorated labels but can match a
//! label that merely embeds another page's digest. [`MatchPolicy::Exact`]
//! requires equality.

use std::collections::HashSet;

use crate::error::{AppError, Result};
use crate::models::{CommentKind, Issue, IssueTag, MatchPolicy};
use crate::pipeline::fingerprint::fingerprint;

/// Outcome of a reconciliation.
#[derive(Debug, Default)]
pub struct ReconcileResult {
    /// URLs without a thread, in sitemap order
    pub pending: Vec<String>,
    /// Number of URLs that already have a thread
    pub initialized: usize,
    /// Issues whose labels could not be decoded
    pub integrity_errors: Vec<AppError>,
}

impl ReconcileResult {
    /// Check if any page needs a thread.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Computes which pages still need a comment thread.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler {
    kind: CommentKind,
    policy: MatchPolicy,
}

impl Reconciler {
    /// Create a reconciler for threads of `kind`.
    pub fn new(kind: CommentKind, policy: MatchPolicy) -> Self {
        Self { kind, policy }
    }

    /// Return the URLs whose fingerprint no issue carries.
    pub fn reconcile(&self, urls: &[String], issues: &[Issue]) -> ReconcileResult {
        let mut integrity_errors = Vec::new();
        let labels: Vec<String> = issues
            .iter()
            .filter_map(|issue| match IssueTag::parse(issue, self.kind) {
                Ok(tag) => Some(tag.fingerprint),
                Err(error) => {
                    integrity_errors.push(error);
                    None
                }
            })
            .collect();

        let exact: HashSet<&str> = match self.policy {
            MatchPolicy::Exact => labels.iter().map(String::as_str).collect(),
            MatchPolicy::Substring => HashSet::new(),
        };

        let mut result = ReconcileResult {
            integrity_errors,
            ..ReconcileResult::default()
        };

        for url in urls {
            let fp = fingerprint(url);
            let found = match self.policy {
                MatchPolicy::Exact => exact.contains(fp.as_str()),
                MatchPolicy::Substring => {
                    labels.iter().any(|label| self.label_matches(label, &fp))
                }
            };

            if found {
                result.initialized += 1;
            } else {
                result.pending.push(url.clone());
            }
        }

        result
    }

    fn label_matches(&self, label: &str, fingerprint: &str) -> bool {
        match self.policy {
            MatchPolicy::Substring => label.contains(fingerprint),
            MatchPolicy::Exact => label == fingerprint,
        }
    }

    /// Like [`Reconciler::reconcile`], failing on the first malformed issue.
    pub fn reconcile_strict(&self, urls: &[String], issues: &[Issue]) -> Result<ReconcileResult> {
        let mut result = self.reconcile(urls, issues);
        if !result.integrity_errors.is_empty() {
            return Err(result.integrity_errors.remove(0));
        }
        Ok(result)
    }
}

/// Convenience function for Gitalk threads with substring matching.
pub fn pending_urls(urls: &[String], issues: &[Issue]) -> Vec<String> {
    Reconciler::new(CommentKind::Gitalk, MatchPolicy::Substring)
        .reconcile(urls, issues)
        .pending
}
