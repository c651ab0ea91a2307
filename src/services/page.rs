// src/services/page.rs

//! Rendered page access.
//!
//! Thread issues are titled after the page they belong to, so every pending
//! URL is fetched once and its `<title>` extracted.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::pipeline::retry::RetryPolicy;
use crate::utils::http::fetch_text;

/// Source of rendered page titles.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Title of the page at `url`, `None` when the page has no usable title.
    async fn fetch_title(&self, url: &str) -> Result<Option<String>>;
}

/// Fetches pages over HTTP.
pub struct HttpPageSource {
    client: Client,
    retry: RetryPolicy,
}

impl HttpPageSource {
    pub fn new(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_title(&self, url: &str) -> Result<Option<String>> {
        let html = self
            .retry
            .run("fetch page", || fetch_text(&self.client, url))
            .await?;
        extract_title(&html)
    }
}

/// Extract the whitespace-normalized text of the first `<title>` element.
pub fn extract_title(html: &str) -> Result<Option<String>> {
    let document = Html::parse_document(html);
    let selector = parse_selector("title")?;

    Ok(document
        .select(&selector)
        .next()
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .filter(|title| !title.is_empty()))
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
