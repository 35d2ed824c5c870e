//! One CLI invocation: open the cache, run the search, print the results.

use std::io::Write;
use std::time::Instant;

use anyhow::{Context, Result};
use merinfo_client::{CacheMode, FetchClient, FetchConfig, Orchestrator, PersonParser, parse_base_url};
use merinfo_core::{AppConfig, CacheDb, Query};

use crate::args::Cli;
use crate::output::{self, Report};

fn cache_mode(cli: &Cli) -> CacheMode {
    if cli.no_cache {
        CacheMode::Disabled
    } else if cli.refresh {
        CacheMode::Refresh
    } else {
        CacheMode::ReadWrite
    }
}

/// Run the search described by `cli`, writing results to `out`.
///
/// The cache, when opened, is closed before returning whether or not the
/// search succeeded.
pub async fn run(cli: &Cli, config: &AppConfig, out: &mut dyn Write) -> Result<()> {
    let query = Query::new(&cli.first_name, &cli.last_name, &cli.city)?;

    let cache = if cli.no_cache && !cli.clear_cache {
        None
    } else {
        let db = CacheDb::open(&config.db_path)
            .await
            .with_context(|| format!("failed to open cache at {}", config.db_path.display()))?;
        Some(db)
    };

    let result = search(cli, config, &query, cache.clone(), out).await;

    if let Some(cache) = cache
        && let Err(e) = cache.close().await
    {
        tracing::warn!(error = %e, "failed to close cache");
    }

    result
}

async fn search(cli: &Cli, config: &AppConfig, query: &Query, cache: Option<CacheDb>, out: &mut dyn Write) -> Result<()> {
    if cli.clear_cache
        && let Some(cache) = &cache
    {
        let removed = cache.clear().await.context("failed to clear cache")?;
        tracing::info!(removed, "cleared response cache");
        // stdout carries only the report in JSON mode
        if cli.json {
            eprintln!("Removed {removed} cached response(s).");
        } else {
            writeln!(out, "Removed {removed} cached response(s).")?;
        }
    }

    let fetcher = FetchClient::new(FetchConfig::from(config))?;
    let parser = PersonParser::new(config.selectors.clone(), parse_base_url(&config.base_url)?);

    let mut orchestrator = Orchestrator::new(fetcher, parser);
    let mode = cache_mode(cli);
    if let Some(cache) = cache
        && mode != CacheMode::Disabled
    {
        orchestrator = orchestrator.with_cache(cache, mode);
    }

    tracing::info!(%query, ?mode, "searching");
    let start = Instant::now();
    let records = orchestrator.run(query).await?;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    let report = Report::new(query, &records, elapsed_ms);

    if cli.json {
        output::write_json(out, &report)?;
    } else {
        output::write_text(out, query, &records)?;
    }

    if let Some(path) = &cli.output {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "saved report");
    }

    Ok(())
}
