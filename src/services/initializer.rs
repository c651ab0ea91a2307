// src/services/initializer.rs

//! Comment thread initializer.
//!
//! Reads the sitemap, lists the existing thread issues, and opens one issue
//! for every page that has none yet. Runs are idempotent: the remote issue
//! list is the only ledger, so a second run over the same sitemap creates
//! nothing.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{Config, Issue, NewIssue};
use crate::pipeline::fingerprint::fingerprint;
use crate::pipeline::reconcile::{ReconcileResult, Reconciler};
use crate::registry::IssueRegistry;
use crate::services::page::PageSource;
use crate::services::sitemap::read_sitemap;
use crate::utils::render_template;
use crate::utils::url::{filter_included, path_of};

/// Lifecycle of an initializer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Idle,
    FetchingSitemap,
    FetchingIssues,
    Reconciling,
    /// Every page already has a thread
    NoPending,
    AwaitingDelay,
    CreatingIssues,
    Verifying,
    Done,
    Failed,
}

impl fmt::Display for InitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A thread opened during this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedThread {
    pub url: String,
    pub number: u64,
    pub title: String,
}

/// A page whose thread could not be opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUrl {
    pub url: String,
    pub reason: String,
}

/// Aggregate outcome of a run.
#[derive(Debug, Default)]
pub struct InitReport {
    /// URLs read from the sitemap after filtering
    pub sitemap_urls: usize,
    /// Issues listed from the registry
    pub existing_issues: usize,
    /// Issues whose labels could not be decoded
    pub integrity_problems: usize,
    pub pending: Vec<String>,
    pub created: Vec<CreatedThread>,
    pub failed: Vec<FailedUrl>,
    /// Created URLs the registry did not list back after verification
    pub unconfirmed: Vec<String>,
    pub dry_run: bool,
}

impl InitReport {
    /// Check if every pending page got its thread.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Drives one initialization run.
pub struct Initializer {
    config: Config,
    registry: Arc<dyn IssueRegistry>,
    pages: Arc<dyn PageSource>,
    reconciler: Reconciler,
    dry_run: bool,
    state: InitState,
}

impl Initializer {
    /// Create an initializer over the given registry and page source.
    pub fn new(
        config: Config,
        registry: Arc<dyn IssueRegistry>,
        pages: Arc<dyn PageSource>,
    ) -> Self {
        let reconciler = Reconciler::new(config.comments.kind, config.comments.match_policy);
        Self {
            config,
            registry,
            pages,
            reconciler,
            dry_run: false,
            state: InitState::Idle,
        }
    }

    /// Report pending pages without creating anything.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Current state.
    pub fn state(&self) -> InitState {
        self.state
    }

    /// Run to completion.
    ///
    /// Setup failures (sitemap, issue listing, strict label check) move the
    /// run to [`InitState::Failed`] and are returned. Per-page creation
    /// failures are collected in the report instead.
    pub async fn run(&mut self) -> Result<InitReport> {
        match self.execute().await {
            Ok(report) => {
                self.transition(InitState::Done);
                Ok(report)
            }
            Err(error) => {
                self.transition(InitState::Failed);
                log::error!("Initialization failed: {}", error);
                Err(error)
            }
        }
    }

    async fn execute(&mut self) -> Result<InitReport> {
        let mut report = InitReport {
            dry_run: self.dry_run,
            ..InitReport::default()
        };

        self.transition(InitState::FetchingSitemap);
        let urls = self.load_urls()?;
        report.sitemap_urls = urls.len();
        log::info!(
            "Read {} URLs from {}",
            urls.len(),
            self.config.site.sitemap_path.display()
        );

        self.transition(InitState::FetchingIssues);
        let issues = self.registry.list_issues().await?;
        report.existing_issues = issues.len();
        log::info!("Found {} existing issues", issues.len());

        self.transition(InitState::Reconciling);
        let result = self.reconcile(&urls, &issues)?;
        report.integrity_problems = result.integrity_errors.len();
        report.pending = unique_by_fingerprint(result.pending);

        if report.pending.is_empty() {
            self.transition(InitState::NoPending);
            log::info!("No new pages; every page already has a thread");
            return Ok(report);
        }

        log::info!("{} pages need a thread", report.pending.len());
        if self.dry_run {
            for url in &report.pending {
                log::info!("  would create: {}", url);
            }
            return Ok(report);
        }

        self.transition(InitState::AwaitingDelay);
        let delay = Duration::from_secs(self.config.settle.delay_secs);
        if !delay.is_zero() {
            log::info!("Waiting {:?} for the deployment to settle", delay);
            tokio::time::sleep(delay).await;
        }

        self.transition(InitState::CreatingIssues);
        let (created, failed) = self.create_all(&report.pending).await;
        report.created = created;
        report.failed = failed;

        if self.config.settle.verify && !report.created.is_empty() {
            self.transition(InitState::Verifying);
            report.unconfirmed = self.verify(&report.created).await;
        }

        log::info!(
            "Created {} threads, {} failed, {} unconfirmed",
            report.created.len(),
            report.failed.len(),
            report.unconfirmed.len()
        );

        Ok(report)
    }

    fn load_urls(&self) -> Result<Vec<String>> {
        let urls = read_sitemap(&self.config.site.sitemap_path)?;
        let total = urls.len();
        let urls = filter_included(urls, &self.config.site.include_paths);
        if urls.len() != total {
            log::debug!("include_paths kept {} of {} URLs", urls.len(), total);
        }
        Ok(urls)
    }

    fn reconcile(&self, urls: &[String], issues: &[Issue]) -> Result<ReconcileResult> {
        if self.config.comments.strict_labels {
            return self.reconciler.reconcile_strict(urls, issues);
        }

        let result = self.reconciler.reconcile(urls, issues);
        for error in &result.integrity_errors {
            log::warn!("Skipping issue: {}", error);
        }
        Ok(result)
    }

    /// Open threads for `pending` through a bounded pool.
    async fn create_all(&self, pending: &[String]) -> (Vec<CreatedThread>, Vec<FailedUrl>) {
        let concurrency = self.config.http.max_concurrent.max(1);
        let total = pending.len();

        let mut outcomes = stream::iter(pending)
            .map(|url| async move { (url.clone(), self.create_thread(url).await) })
            .buffer_unordered(concurrency);

        let mut created = Vec::new();
        let mut failed = Vec::new();
        while let Some((url, outcome)) = outcomes.next().await {
            let done = created.len() + failed.len() + 1;
            match outcome {
                Ok(thread) => {
                    log::info!("[{}/{}] #{} {}", done, total, thread.number, thread.url);
                    created.push(thread);
                }
                Err(error) => {
                    log::warn!(
                        "[{}/{}] Failed to create thread for {}: {}",
                        done,
                        total,
                        url,
                        error
                    );
                    failed.push(FailedUrl {
                        url,
                        reason: error.to_string(),
                    });
                }
            }
        }

        (created, failed)
    }

    async fn create_thread(&self, url: &str) -> Result<CreatedThread> {
        let path = path_of(url);
        let title = self
            .pages
            .fetch_title(url)
            .await?
            .unwrap_or_else(|| path.clone());

        let body = self
            .config
            .comments
            .body_template
            .as_deref()
            .filter(|template| !template.is_empty())
            .map(|template| {
                render_template(
                    template,
                    &[("url", url), ("path", path.as_str()), ("title", title.as_str())],
                )
            });

        let payload = NewIssue::thread(self.config.comments.kind, fingerprint(url), &title, body);
        let issue = self.registry.create_issue(&payload).await?;

        Ok(CreatedThread {
            url: url.to_string(),
            number: issue.number,
            title,
        })
    }

    /// Poll the registry until every created thread is listed back.
    ///
    /// Returns the URLs still missing after the last poll.
    async fn verify(&self, created: &[CreatedThread]) -> Vec<String> {
        let urls: Vec<String> = created.iter().map(|thread| thread.url.clone()).collect();
        let polls = self.config.settle.verify_polls;
        let interval = Duration::from_secs(self.config.settle.verify_interval_secs);
        let mut unconfirmed = urls.clone();

        for poll in 1..=polls {
            match self.registry.list_issues().await {
                Ok(issues) => {
                    unconfirmed = self.reconciler.reconcile(&urls, &issues).pending;
                }
                Err(error) => {
                    log::warn!("Verification poll {}/{} failed: {}", poll, polls, error);
                }
            }

            if unconfirmed.is_empty() {
                log::debug!("All created threads confirmed after {} polls", poll);
                return unconfirmed;
            }
            if poll < polls {
                log::debug!(
                    "{} threads not listed yet; polling again in {:?}",
                    unconfirmed.len(),
                    interval
                );
                tokio::time::sleep(interval).await;
            }
        }

        for url in &unconfirmed {
            log::warn!("Thread not confirmed: {}", url);
        }
        unconfirmed
    }

    fn transition(&mut self, next: InitState) {
        log::debug!("{} -> {}", self.state, next);
        self.state = next;
    }
}

/// Keep the first URL of every fingerprint, in order.
///
/// Sitemaps may list a page twice or under several hosts; each page gets a
/// single thread.
fn unique_by_fingerprint(urls: Vec<String>) -> Vec<String> {
    let total = urls.len();
    let mut seen = HashSet::new();
    let unique: Vec<String> = urls
        .into_iter()
        .filter(|url| seen.insert(fingerprint(url)))
        .collect();
    if unique.len() != total {
        log::debug!(
            "Collapsed {} pending URLs sharing a fingerprint",
            total - unique.len()
        );
    }
    unique
}
