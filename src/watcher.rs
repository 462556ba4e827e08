//! Run driver
//!
//! Owns the shared fetcher, the stores, and the dispatcher, and turns one
//! site list into one finished run: scrape everything with bounded
//! concurrency, diff against the prior state, notify, persist.

use crate::config::Config;
use crate::detect::{detect_changes, ChangeRecord};
use crate::model::{ScrapeResult, SiteConfig};
use crate::notify::NotificationDispatcher;
use crate::render::PageRenderer;
use crate::scrape::strategy::{run_strategy, StrategyContext};
use crate::scrape::Fetcher;
use crate::storage::{HistoryRecord, HistoryStore, StateStore};
use crate::{Result, WatchError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Everything one run produced
#[derive(Debug)]
pub struct RunOutcome {
    /// One result per configured site, in catalog order
    pub results: Vec<ScrapeResult>,
    /// Reportable differences against the prior state
    pub changes: Vec<ChangeRecord>,
}

/// In-process guard against overlapping runs
///
/// Two concurrent runs would race on the state and history files; the
/// second caller gets [`WatchError::RunInProgress`] instead.
#[derive(Debug, Default)]
struct RunLock {
    busy: AtomicBool,
}

impl RunLock {
    fn acquire(&self) -> Result<RunGuard<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            Ok(RunGuard { lock: self })
        } else {
            Err(WatchError::RunInProgress)
        }
    }
}

struct RunGuard<'a> {
    lock: &'a RunLock,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.lock.busy.store(false, Ordering::SeqCst);
    }
}

/// The top-level driver for price checks
pub struct Watcher {
    config: Config,
    fetcher: Arc<Fetcher>,
    renderer: Option<Arc<dyn PageRenderer>>,
    state_store: StateStore,
    history_store: HistoryStore,
    dispatcher: NotificationDispatcher,
    run_lock: RunLock,
}

impl Watcher {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = Arc::new(Fetcher::new(&config.fetch)?);
        let state_store = StateStore::new(&config.storage.state_path);
        let history_store = HistoryStore::new(&config.storage.history_path);
        let dispatcher = NotificationDispatcher::from_config(&config.notify);

        Ok(Self {
            config,
            fetcher,
            renderer: None,
            state_store,
            history_store,
            dispatcher,
            run_lock: RunLock::default(),
        })
    }

    /// Injects the browser rendering capability used by rendered-page sites
    pub fn with_renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Runs one full check over the given sites
    ///
    /// With `dry_run` set, everything runs except notifications and the
    /// state/history writes.
    pub async fn run(&self, sites: &[SiteConfig], dry_run: bool) -> Result<RunOutcome> {
        let _guard = self.run_lock.acquire()?;

        tracing::info!(
            "Checking {} site(s) for variant {}",
            sites.len(),
            self.config.watch.target_variant
        );

        let prior = self.state_store.load();
        let results = self.scrape_batch(sites).await;
        let changes = detect_changes(&results, &prior);
        tracing::info!(
            "{} result(s), {} reportable change(s)",
            results.len(),
            changes.len()
        );

        if dry_run {
            tracing::info!("Dry run: skipping notifications and persistence");
            return Ok(RunOutcome { results, changes });
        }

        self.dispatcher.dispatch(&changes).await;

        let mut state = prior;
        let mut history = self.history_store.load();
        for result in &results {
            state.record(result);
            history.append(
                &result.name,
                HistoryRecord {
                    timestamp: result.timestamp,
                    price: result.price,
                    availability: result.availability,
                    error: result.error.clone(),
                },
            );
        }
        self.state_store.save(&state)?;
        self.history_store.save(&history)?;

        Ok(RunOutcome { results, changes })
    }

    /// Scrapes all sites with at most `max-concurrent-sites` in flight
    ///
    /// Sites sharing a URL are grouped into one sequential task, so a single
    /// URL is never fetched concurrently with itself. Output order matches
    /// input order regardless of completion order.
    async fn scrape_batch(&self, sites: &[SiteConfig]) -> Vec<ScrapeResult> {
        let ctx = StrategyContext {
            fetcher: Arc::clone(&self.fetcher),
            renderer: self.renderer.clone(),
            target_variant: self.config.watch.target_variant.clone(),
            min_plausible_price: self.config.watch.min_plausible_price,
        };
        let semaphore = Arc::new(Semaphore::new(self.config.pipeline.max_concurrent_sites));

        let mut groups: Vec<Vec<(usize, SiteConfig)>> = Vec::new();
        let mut group_by_url: HashMap<&str, usize> = HashMap::new();
        for (index, site) in sites.iter().enumerate() {
            match group_by_url.get(site.url.as_str()) {
                Some(&g) => groups[g].push((index, site.clone())),
                None => {
                    group_by_url.insert(&site.url, groups.len());
                    groups.push(vec![(index, site.clone())]);
                }
            }
        }

        let mut join_set = JoinSet::new();
        for group in groups {
            let ctx = ctx.clone();
            let semaphore = Arc::clone(&semaphore);
            join_set.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return group
                            .into_iter()
                            .map(|(index, site)| {
                                let mut result = ScrapeResult::new(&site);
                                result.error = Some("scheduler shut down".to_string());
                                (index, result)
                            })
                            .collect();
                    }
                };

                let mut out = Vec::with_capacity(group.len());
                for (index, site) in group {
                    tracing::debug!("[{}] checking {}", site.name, site.url);
                    let result = run_strategy(&site, &ctx).await;
                    out.push((index, result));
                }
                out
            });
        }

        let mut slots: Vec<Option<ScrapeResult>> = vec![None; sites.len()];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(pairs) => {
                    for (index, result) in pairs {
                        slots[index] = Some(result);
                    }
                }
                Err(e) => tracing::error!("Site task failed: {}", e),
            }
        }

        // A panicked task leaves holes; fill them with error results so the
        // batch still yields one result per site
        sites
            .iter()
            .zip(slots.iter_mut())
            .map(|(site, slot)| {
                slot.take().unwrap_or_else(|| {
                    let mut result = ScrapeResult::new(site);
                    result.error = Some("internal task failure".to_string());
                    result
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_lock_rejects_second_acquire() {
        let lock = RunLock::default();
        let guard = lock.acquire().unwrap();
        assert!(matches!(lock.acquire(), Err(WatchError::RunInProgress)));
        drop(guard);
        assert!(lock.acquire().is_ok());
    }

    // Full-run behavior is covered by the wiremock integration tests in
    // tests/pipeline_tests.rs
}
