// src/models/mod.rs

//! Domain models for the initializer and the listing paginator.

mod config;
mod issue;
mod kind;
mod listing;

// Re-export all public types
pub use config::{
    CommentsConfig, Config, GithubConfig, HttpConfig, MatchPolicy, PaginationConfig,
    SettleConfig, SiteConfig,
};
pub use issue::{Issue, IssueTag, Label, NewIssue};
pub use kind::CommentKind;
pub use listing::{ListingData, ListingPage, Page, Post};
