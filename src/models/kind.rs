//! Comment widget backends.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Comment widget whose threads are backed by GitHub issues.
///
/// The variant name doubles as the first label of every thread issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CommentKind {
    #[default]
    Gitalk,
    Gitment,
}

impl CommentKind {
    /// Label marking an issue as a thread of this widget.
    pub fn label(&self) -> &'static str {
        match self {
            CommentKind::Gitalk => "Gitalk",
            CommentKind::Gitment => "Gitment",
        }
    }
}

impl fmt::Display for CommentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
