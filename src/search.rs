use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::CatalogError;
use crate::models::{MovieRecord, TrendingEntry};
use crate::rank::rank;
use crate::tmdb::CatalogApi;
use crate::trends::{TrendTracker, DEFAULT_TRENDING_LIMIT};

#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    Idle,
    Loading {
        query: String,
    },
    Success {
        query: String,
        movies: Vec<MovieRecord>,
    },
    Error {
        query: String,
        error: CatalogError,
    },
}

impl SearchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SearchState::Loading { .. })
    }

    pub fn movies(&self) -> &[MovieRecord] {
        match self {
            SearchState::Success { movies, .. } => movies,
            _ => &[],
        }
    }

    pub fn error_message(&self) -> Option<String> {
        match self {
            SearchState::Error { error, .. } => Some(error.user_message()),
            _ => None,
        }
    }
}

/// Debounced search driver.
///
/// Every keystroke bumps a generation counter and replaces the single pending
/// debounce timer. A settled timer fetches with the generation it was armed with;
/// results are published only while that generation is still the latest, so a slow
/// response for an abandoned query can never overwrite a newer one.
#[derive(Clone)]
pub struct SearchOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    catalog: Arc<dyn CatalogApi>,
    trends: TrendTracker,
    debounce: Duration,
    generation: AtomicU64,
    query: Mutex<String>,
    pending: Mutex<Option<JoinHandle<()>>>,
    state: watch::Sender<SearchState>,
    trending: watch::Sender<Vec<TrendingEntry>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SearchOrchestrator {
    pub fn new(catalog: Arc<dyn CatalogApi>, trends: TrendTracker, debounce: Duration) -> Self {
        let (state, _) = watch::channel(SearchState::Idle);
        let (trending, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Inner {
                catalog,
                trends,
                debounce,
                generation: AtomicU64::new(0),
                query: Mutex::new(String::new()),
                pending: Mutex::new(None),
                state,
                trending,
            }),
        }
    }

    pub fn state(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }

    pub fn trending(&self) -> Vec<TrendingEntry> {
        self.inner.trending.borrow().clone()
    }

    pub fn subscribe_trending(&self) -> watch::Receiver<Vec<TrendingEntry>> {
        self.inner.trending.subscribe()
    }

    pub fn query(&self) -> String {
        lock(&self.inner.query).clone()
    }

    /// Initial load: popular titles for the current (normally empty) query plus trending terms.
    pub fn mount(&self) {
        info!("Mounting search, loading popular titles");
        self.fetch_now();
        let this = self.clone();
        tokio::spawn(async move {
            this.refresh_trending().await;
        });
    }

    /// Replaces the search box contents. Only the value that survives the debounce window fetches.
    pub fn set_query(&self, raw: impl Into<String>) {
        let raw = raw.into();
        let generation = self.next_generation();
        *lock(&self.inner.query) = raw.clone();

        let this = self.clone();
        let debounce = self.inner.debounce;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            this.start_fetch(generation, raw);
        });
        if let Some(previous) = lock(&self.inner.pending).replace(timer) {
            previous.abort();
        }
    }

    /// User-initiated reload of the current query, bypassing the debounce.
    pub fn retry(&self) {
        info!("Retrying catalog fetch");
        self.fetch_now();
    }

    pub async fn refresh_trending(&self) -> Vec<TrendingEntry> {
        let entries = self.inner.trends.top_trending(DEFAULT_TRENDING_LIMIT).await;
        debug!(count = entries.len(), "Trending searches refreshed");
        self.inner.trending.send_replace(entries.clone());
        entries
    }

    fn fetch_now(&self) {
        let generation = self.next_generation();
        if let Some(previous) = lock(&self.inner.pending).take() {
            previous.abort();
        }
        self.start_fetch(generation, self.query());
    }

    fn next_generation(&self) -> u64 {
        self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.inner.generation.load(Ordering::SeqCst) == generation
    }

    // Fetches run on their own task so aborting a timer never cuts a request short.
    fn start_fetch(&self, generation: u64, query: String) {
        let this = self.clone();
        tokio::spawn(async move { this.run_fetch(generation, query).await });
    }

    /// Publishes `next` only if `generation` is still the latest.
    fn publish(&self, generation: u64, next: SearchState) -> bool {
        self.inner.state.send_if_modified(|state| {
            if !self.is_current(generation) {
                return false;
            }
            *state = next;
            true
        })
    }

    async fn run_fetch(&self, generation: u64, query: String) {
        if !self.publish(
            generation,
            SearchState::Loading {
                query: query.clone(),
            },
        ) {
            debug!(generation, "Superseded before fetch started");
            return;
        }

        let result = self.inner.catalog.fetch_catalog(&query).await;
        let searching = !query.trim().is_empty();

        match result {
            Ok(results) => {
                let movies = if searching {
                    rank(&results, &query)
                } else {
                    results
                };
                let top = movies.first().cloned();
                let count = movies.len();
                let published = self.publish(
                    generation,
                    SearchState::Success {
                        query: query.clone(),
                        movies,
                    },
                );
                if !published {
                    debug!(generation, query = %query, "Discarding stale catalog response");
                    return;
                }
                info!(query = %query, results = count, "Catalog fetch completed");
                if let (true, Some(top)) = (searching, top) {
                    self.inner.trends.spawn_record_search(query, top);
                }
            }
            Err(error) => {
                let detail = error.to_string();
                let published = self.publish(
                    generation,
                    SearchState::Error {
                        query: query.clone(),
                        error,
                    },
                );
                if published {
                    warn!(query = %query, "Catalog fetch failed: {}", detail);
                } else {
                    debug!(generation, "Discarding stale catalog failure: {}", detail);
                }
            }
        }
    }
}
