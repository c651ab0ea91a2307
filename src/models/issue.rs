//! Issue registry records and the label convention used by comment threads.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::CommentKind;

/// A label attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// An issue as returned by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Repository-scoped issue number
    pub number: u64,

    pub title: String,

    /// Labels in the order the registry reports them
    #[serde(default)]
    pub labels: Vec<Label>,

    /// Present when the "issue" is actually a pull request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    /// Create an issue with the given label names.
    pub fn new(number: u64, title: impl Into<String>, labels: &[&str]) -> Self {
        Self {
            number,
            title: title.into(),
            labels: labels.iter().map(|&name| Label::from(name)).collect(),
            pull_request: None,
        }
    }

    /// Whether this entry is a pull request rather than an issue.
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

/// Payload for creating a new thread issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl NewIssue {
    /// Build the payload for a thread: labels are `[kind, fingerprint]`.
    pub fn thread(
        kind: CommentKind,
        fingerprint: impl Into<String>,
        title: impl Into<String>,
        body: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            labels: vec![kind.label().to_string(), fingerprint.into()],
            body,
        }
    }
}

/// Kind marker and fingerprint label decoded from an issue's labels.
///
/// When the first label is the kind marker, the fingerprint label is the
/// second one; otherwise the first label is taken as the fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueTag {
    pub kind: Option<CommentKind>,
    pub fingerprint: String,
}

impl IssueTag {
    /// Decode the tag of `issue` using `marker` as the kind label.
    pub fn parse(issue: &Issue, marker: CommentKind) -> Result<Self> {
        let mut labels = issue.labels.iter().map(|l| l.name.as_str());

        match labels.next() {
            None => Err(AppError::data_integrity(issue.number, "issue has no labels")),
            Some(first) if first == marker.label() => match labels.next() {
                Some(fingerprint) => Ok(Self {
                    kind: Some(marker),
                    fingerprint: fingerprint.to_string(),
                }),
                None => Err(AppError::data_integrity(
                    issue.number,
                    format!("'{first}' marker without a fingerprint label"),
                )),
            },
            Some(first) => Ok(Self {
                kind: None,
                fingerprint: first.to_string(),
            }),
        }
    }
}
