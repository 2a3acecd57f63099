//! Crawl coordination
//!
//! The coordinator drives the whole run: it claims a batch of URLs from the
//! frontier, fans the batch out to one worker task per URL, joins on a
//! result channel the scheduler alone owns, and either continues with the
//! next batch or fails the run fast. Workers never talk to each other:
//! everything they share (the breaker, the session counters, the frontier)
//! is handed to them up front.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reqwest::Client;
use tokio::sync::mpsc;

use crate::config::{CrawlerOptions, Settings};
use crate::crawler::breaker::CircuitBreaker;
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchOutcome};
use crate::extract::Extractor;
use crate::frontier::Frontier;
use crate::pipeline;
use crate::stats::{run_reporter, CrawlSession};
use crate::store::{Namespace, Store};
use crate::{ConfigError, CrawlError, Result};

/// Key holding the persisted settings record.
const SETTINGS_KEY: &str = "settings";

/// Lifecycle of one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    /// The todo set drained; final join and statistics flush in progress
    Draining,
    /// A fatal error terminated the run at a batch join
    Aborted,
    Stopped,
}

/// Crawler instance driving a shared frontier
pub struct Crawler {
    options: CrawlerOptions,
    settings: Settings,
    frontier: Frontier,
    client: Client,
    extractor: Option<Arc<dyn Extractor>>,
    session: Arc<CrawlSession>,
    breaker: Arc<CircuitBreaker>,
    run_flag: Arc<AtomicBool>,
    state: RunState,
}

impl Crawler {
    /// Connects an instance to the shared store.
    ///
    /// Verifies the store is reachable, persists `supplied` settings (or
    /// loads the existing record; a missing record is a startup error),
    /// optionally erases previous crawl state, builds the HTTP client and
    /// seeds the base URL into `todo`.
    pub async fn init(
        options: CrawlerOptions,
        store: Arc<dyn Store>,
        supplied: Option<Settings>,
        extractor: Option<Arc<dyn Extractor>>,
    ) -> Result<Self> {
        store.ping().await?;

        if let Some(settings) = &supplied {
            let record = serde_json::to_string(settings)
                .map_err(|e| ConfigError::Validation(format!("unserializable settings: {e}")))?;
            store.put(Namespace::Settings, SETTINGS_KEY, &record).await?;
            tracing::info!("saved settings for {}", settings.base_url);
        }

        let settings: Settings = match store.get(Namespace::Settings, SETTINGS_KEY).await? {
            Some(record) => serde_json::from_str(&record).map_err(|e| {
                ConfigError::Validation(format!("stored settings record is unreadable: {e}"))
            })?,
            None => return Err(ConfigError::MissingSettings.into()),
        };
        tracing::info!("loaded settings for {}", settings.base_url);

        if !settings.extraction_rules.is_empty() && extractor.is_none() {
            return Err(ConfigError::Validation(
                "extraction rules are configured but no extraction backend was provided".into(),
            )
            .into());
        }

        if options.erase_store {
            tracing::info!("erasing previous crawl state");
            store.flush_all().await?;
            // the settings record was wiped with everything else; keep it
            let record = serde_json::to_string(&settings)
                .map_err(|e| ConfigError::Validation(format!("unserializable settings: {e}")))?;
            store.put(Namespace::Settings, SETTINGS_KEY, &record).await?;
        }

        let client = build_http_client(&options)?;
        let frontier = Frontier::new(store);

        if !settings.base_url.is_empty() {
            frontier.add_seeds(&[settings.base_url.clone()]).await?;
        }

        Ok(Self {
            breaker: Arc::new(CircuitBreaker::new(options.max_errors)),
            session: Arc::new(CrawlSession::new()),
            run_flag: Arc::new(AtomicBool::new(false)),
            state: RunState::Idle,
            options,
            settings,
            frontier,
            client,
            extractor,
        })
    }

    /// Runs the crawl to completion or the first fatal error.
    ///
    /// Normal termination happens when the todo set drains. Store
    /// unavailability, an extraction failure or a tripped circuit breaker
    /// abort the run at the next batch join.
    pub async fn crawl(&mut self) -> Result<()> {
        tracing::info!("starting crawl on {}", self.settings.base_url);
        self.state = RunState::Running;
        self.session.reset();
        self.run_flag.store(true, Ordering::SeqCst);

        let reporter = tokio::spawn(run_reporter(
            self.frontier.clone(),
            Arc::clone(&self.session),
            Arc::clone(&self.breaker),
            Arc::clone(&self.run_flag),
            self.options.stats_interval,
        ));

        let outcome = self.run_batches().await;

        self.state = match &outcome {
            Ok(()) => RunState::Draining,
            Err(_) => RunState::Aborted,
        };
        self.run_flag.store(false, Ordering::SeqCst);
        let _ = reporter.await;

        if let Ok(counts) = self.frontier.counts().await {
            if counts.doing > 0 {
                tracing::warn!(
                    "{} urls are still marked doing (crashed workers?); \
                     run `scuttle recover` to requeue them",
                    counts.doing
                );
            }
            self.session.log_summary(&counts, self.breaker.current());
        }

        self.state = RunState::Stopped;
        outcome
    }

    /// One round of claimed work per iteration, until todo drains.
    async fn run_batches(&self) -> Result<()> {
        loop {
            if self.frontier.todo_size().await? == 0 {
                tracing::info!("no more work to do");
                return Ok(());
            }

            let batch = self.frontier.claim_batch(self.options.workers).await?;
            if batch.is_empty() {
                // todo emptied between the size check and the draws
                return Ok(());
            }

            let (result_tx, mut result_rx) = mpsc::channel(batch.len());
            for (id, url) in batch.into_iter().enumerate() {
                let worker = Worker {
                    id,
                    settings: self.settings.clone(),
                    frontier: self.frontier.clone(),
                    client: self.client.clone(),
                    extractor: self.extractor.clone(),
                    breaker: Arc::clone(&self.breaker),
                    session: Arc::clone(&self.session),
                };
                let tx = result_tx.clone();
                tokio::spawn(async move {
                    let result = worker.process(&url).await;
                    let _ = tx.send(result).await;
                });
            }
            drop(result_tx);

            // join: every worker in the batch reports before the next round
            while let Some(result) = result_rx.recv().await {
                result?;
            }
        }
    }

    /// Adds seed URLs to the todo set unconditionally.
    pub async fn add_seeds(&self, urls: &[String]) -> Result<()> {
        self.frontier.add_seeds(urls).await?;
        Ok(())
    }

    /// URL -> extracted-data pairs for completed URLs.
    pub async fn dump_map(&self) -> Result<BTreeMap<String, String>> {
        Ok(self.frontier.dump_map().await?)
    }

    /// Current run state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// The settings this instance crawls with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

/// Everything one worker task needs, cloned out of the coordinator
struct Worker {
    id: usize,
    settings: Settings,
    frontier: Frontier,
    client: Client,
    extractor: Option<Arc<dyn Extractor>>,
    breaker: Arc<CircuitBreaker>,
    session: Arc<CrawlSession>,
}

impl Worker {
    /// Fetches, extracts, filters and completes one claimed URL.
    ///
    /// Per-URL fetch failures are absorbed here (trash transition plus
    /// breaker update); only store unavailability, extraction failure or a
    /// tripped breaker escape to the join.
    async fn process(&self, url: &str) -> Result<()> {
        let body = match fetch_url(&self.client, url).await {
            FetchOutcome::Success { body } => body,
            FetchOutcome::HttpError { status } => {
                tracing::debug!("worker #{}: {url} returned status {status}", self.id);
                return self.record_failure(url).await;
            }
            FetchOutcome::TransportError { error } => {
                tracing::debug!("worker #{}: fetching {url} failed: {error}", self.id);
                return self.record_failure(url).await;
            }
        };
        self.breaker.record_success();

        // extraction runs before any link handling so a broken rule spec
        // aborts the run instead of half-completing the page
        let extracted = match &self.extractor {
            Some(extractor) if !self.settings.extraction_rules.is_empty() => extractor
                .extract(&body, &self.settings.extraction_rules)
                .map_err(|source| CrawlError::Extraction {
                    url: url.to_string(),
                    source,
                })?
                .to_string(),
            _ => String::new(),
        };

        let text = String::from_utf8_lossy(&body);
        let links = pipeline::candidates(&text, &self.settings);

        self.frontier.complete_success(url, &extracted).await?;

        let mut admitted = 0;
        for link in &links {
            if self.frontier.add_discovered(link).await? {
                admitted += 1;
            }
        }
        if admitted > 0 {
            tracing::info!("worker #{}: {admitted} new urls from {url}", self.id);
        }

        self.session.record_parsed();
        Ok(())
    }

    /// Routes a failed fetch to trash and feeds the breaker; only a tripped
    /// threshold is fatal.
    async fn record_failure(&self, url: &str) -> Result<()> {
        self.frontier.complete_failure(url).await?;
        if let Some(count) = self.breaker.record_failure() {
            return Err(CrawlError::TooManyErrors { count });
        }
        Ok(())
    }
}
