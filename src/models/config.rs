//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::CommentKind;
use crate::pipeline::paginate::SortOrder;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Repository holding the thread issues
    #[serde(default)]
    pub github: GithubConfig,

    /// Where the site's pages come from
    #[serde(default)]
    pub site: SiteConfig,

    /// Comment widget conventions
    #[serde(default)]
    pub comments: CommentsConfig,

    /// HTTP client behavior
    #[serde(default)]
    pub http: HttpConfig,

    /// Waiting and verification around issue creation
    #[serde(default)]
    pub settle: SettleConfig,

    /// Special page listings
    #[serde(default)]
    pub pagination: PaginationConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.github.owner.trim().is_empty() {
            return Err(AppError::validation("github.owner is empty"));
        }
        if self.github.repo.trim().is_empty() {
            return Err(AppError::validation("github.repo is empty"));
        }
        if self.github.token.trim().is_empty() {
            return Err(AppError::validation("GitHub token is empty"));
        }
        if self.github.per_page == 0 || self.github.per_page > 100 {
            return Err(AppError::validation("github.per_page must be in 1..=100"));
        }
        if self.github.max_pages == 0 {
            return Err(AppError::validation("github.max_pages must be > 0"));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.http.max_concurrent == 0 {
            return Err(AppError::validation("http.max_concurrent must be > 0"));
        }
        if self.settle.verify && self.settle.verify_polls == 0 {
            return Err(AppError::validation(
                "settle.verify_polls must be > 0 when settle.verify is enabled",
            ));
        }
        SortOrder::parse(&self.pagination.order_by)?;
        Ok(())
    }

    /// The configured issues endpoint.
    pub fn issues_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/issues",
            self.github.api_base.trim_end_matches('/'),
            self.github.owner,
            self.github.repo
        )
    }
}

/// Repository holding the thread issues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Owner (user or organization) of the repository
    #[serde(default)]
    pub owner: String,

    /// Repository name
    #[serde(default = "defaults::repo")]
    pub repo: String,

    /// API token, supplied on the command line
    #[serde(default, skip_serializing)]
    pub token: String,

    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    /// Issues per listing request (GitHub caps this at 100)
    #[serde(default = "defaults::per_page")]
    pub per_page: u32,

    /// Upper bound on listing requests per run
    #[serde(default = "defaults::max_pages")]
    pub max_pages: u32,

    /// Issue state filter: `open`, `closed` or `all`
    #[serde(default = "defaults::state")]
    pub state: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: defaults::repo(),
            token: String::new(),
            api_base: defaults::api_base(),
            per_page: defaults::per_page(),
            max_pages: defaults::max_pages(),
            state: defaults::state(),
        }
    }
}

/// Site input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Path of the generated sitemap
    #[serde(default = "defaults::sitemap_path")]
    pub sitemap_path: PathBuf,

    /// Only initialize URLs containing one of these fragments (empty = all)
    #[serde(default)]
    pub include_paths: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            sitemap_path: defaults::sitemap_path(),
            include_paths: Vec::new(),
        }
    }
}

/// How a fingerprint is compared with an issue's fingerprint label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Label contains the fingerprint
    #[default]
    Substring,
    /// Label equals the fingerprint
    Exact,
}

/// Comment widget conventions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentsConfig {
    #[serde(default)]
    pub kind: CommentKind,

    #[serde(default)]
    pub match_policy: MatchPolicy,

    /// Abort when an issue's labels break the kind/fingerprint convention
    #[serde(default)]
    pub strict_labels: bool,

    /// Issue body; `{url}`, `{path}` and `{title}` are substituted
    #[serde(default = "defaults::body_template")]
    pub body_template: Option<String>,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            kind: CommentKind::default(),
            match_policy: MatchPolicy::default(),
            strict_labels: false,
            body_template: defaults::body_template(),
        }
    }
}

/// HTTP client and retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent issue creations
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Retries after the first attempt
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    #[serde(default = "defaults::retry_base")]
    pub retry_base_ms: u64,

    #[serde(default = "defaults::retry_max")]
    pub retry_max_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
            max_retries: defaults::max_retries(),
            retry_base_ms: defaults::retry_base(),
            retry_max_ms: defaults::retry_max(),
        }
    }
}

/// Waiting and verification around issue creation.
///
/// New pages are often not served yet right after a deploy, and the issue
/// listing lags behind writes. The delay covers the first, verification
/// polls the second.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettleConfig {
    /// Wait before the first creation, in seconds
    #[serde(default = "defaults::settle_delay")]
    pub delay_secs: u64,

    /// Re-list issues after creation and confirm every thread exists
    #[serde(default = "defaults::verify")]
    pub verify: bool,

    #[serde(default = "defaults::verify_polls")]
    pub verify_polls: u32,

    #[serde(default = "defaults::verify_interval")]
    pub verify_interval_secs: u64,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            delay_secs: defaults::settle_delay(),
            verify: defaults::verify(),
            verify_polls: defaults::verify_polls(),
            verify_interval_secs: defaults::verify_interval(),
        }
    }
}

/// Special page listing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Posts per listing page, 0 disables pagination
    #[serde(default = "defaults::listing_per_page")]
    pub per_page: usize,

    #[serde(default = "defaults::pagination_dir")]
    pub pagination_dir: String,

    /// Sort key, `-` prefix for descending
    #[serde(default = "defaults::order_by")]
    pub order_by: String,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            per_page: defaults::listing_per_page(),
            pagination_dir: defaults::pagination_dir(),
            order_by: defaults::order_by(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // GitHub defaults
    pub fn repo() -> String {
        "gitalk".into()
    }
    pub fn api_base() -> String {
        "https://api.github.com".into()
    }
    pub fn per_page() -> u32 {
        100
    }
    pub fn max_pages() -> u32 {
        50
    }
    pub fn state() -> String {
        "all".into()
    }

    // Site defaults
    pub fn sitemap_path() -> PathBuf {
        PathBuf::from("public/sitemap.xml")
    }

    // Comment defaults
    pub fn body_template() -> Option<String> {
        Some("{url}".into())
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "comment-init/0.1".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        4
    }
    pub fn max_retries() -> u32 {
        3
    }
    pub fn retry_base() -> u64 {
        500
    }
    pub fn retry_max() -> u64 {
        20_000
    }

    // Settle defaults
    pub fn settle_delay() -> u64 {
        40
    }
    pub fn verify() -> bool {
        true
    }
    pub fn verify_polls() -> u32 {
        3
    }
    pub fn verify_interval() -> u64 {
        10
    }

    // Pagination defaults
    pub fn listing_per_page() -> usize {
        10
    }
    pub fn pagination_dir() -> String {
        "page".into()
    }
    pub fn order_by() -> String {
        "-date".into()
    }
}
