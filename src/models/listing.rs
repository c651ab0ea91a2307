//! Site pages, posts and the listing pages generated for "special" pages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A generated site page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    /// Output path, e.g. `travel/index.html`
    pub path: String,

    pub title: String,

    /// Tag of posts this page aggregates, if it is a special listing
    #[serde(default)]
    pub special: Option<String>,
}

/// A blog post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub title: String,

    pub path: String,

    pub date: DateTime<Utc>,

    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,

    #[serde(default)]
    pub special: Option<String>,
}

/// Template data for one listing page.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ListingData {
    /// Path of the first page
    pub base: String,
    /// Number of pages in this listing
    pub total: usize,
    /// 1-based index of this page
    pub current: usize,
    pub current_url: String,
    pub posts: Vec<Post>,
    /// Previous page index, 0 on the first page
    pub prev: usize,
    pub prev_link: String,
    /// Next page index, 0 on the last page
    pub next: usize,
    pub next_link: String,
    /// Title of the special page
    pub title: String,
}

/// One generated listing page.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ListingPage {
    pub path: String,
    /// Layouts to try, most specific first
    pub layout: Vec<String>,
    pub data: ListingData,
}
