// src/pipeline/init.rs

//! Comment thread initialization pipeline.

use std::sync::Arc;

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::retry::RetryPolicy;
use crate::registry::GithubRegistry;
use crate::services::{HttpPageSource, InitReport, Initializer};
use crate::utils::http::create_async_client;

/// Run the initializer against GitHub and the live site.
pub async fn run_init(config: &Config, dry_run: bool) -> Result<InitReport> {
    config.validate()?;

    let client = create_async_client(&config.http)?;
    let retry = RetryPolicy::from_config(&config.http);

    let registry = GithubRegistry::new(config, client.clone());
    let pages = HttpPageSource::new(client, retry);

    log::info!(
        "Initializing {} threads for {}/{}",
        config.comments.kind,
        config.github.owner,
        config.github.repo
    );

    Initializer::new(config.clone(), Arc::new(registry), Arc::new(pages))
        .dry_run(dry_run)
        .run()
        .await
}
