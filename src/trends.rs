use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::appwrite::AppwriteClient;
use crate::config::TrendStoreConfig;
use crate::error::PersistenceError;
use crate::models::{MovieRecord, TrendingEntry, POSTER_BASE};
use crate::store::{Document, DocumentQuery, DocumentStore};

pub const DEFAULT_TRENDING_LIMIT: usize = 4;

const TERM_FIELD: &str = "searchTerm";
const COUNT_FIELD: &str = "count";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrendUpdate {
    Created,
    Incremented { count: u64 },
}

/// Search-term popularity counters. Never surfaces store failures to its callers.
#[derive(Clone)]
pub struct TrendTracker {
    store: Option<Arc<dyn DocumentStore>>,
}

#[derive(Debug, Deserialize)]
struct StoredTrend {
    #[serde(rename = "searchTerm")]
    search_term: String,
    #[serde(default)]
    count: u64,
    #[serde(default)]
    movie_id: u64,
    #[serde(default)]
    poster_url: Option<String>,
}

impl TrendTracker {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store: Some(store) }
    }

    pub fn disabled() -> Self {
        Self { store: None }
    }

    /// Appwrite-backed tracker, or a disabled one when the store cannot be set up.
    pub fn from_config(config: &TrendStoreConfig) -> Self {
        match AppwriteClient::new(config) {
            Ok(client) => Self::new(Arc::new(client)),
            Err(e) => {
                warn!("Trend tracking disabled: {}", e);
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    fn store(&self) -> Result<&Arc<dyn DocumentStore>, PersistenceError> {
        self.store.as_ref().ok_or(PersistenceError::NotConfigured)
    }

    /// Looks the term up by exact match; bumps its count or creates it with count 1.
    pub async fn try_record_search(
        &self,
        term: &str,
        top_movie: &MovieRecord,
    ) -> Result<TrendUpdate, PersistenceError> {
        let store = self.store()?;
        let existing = store
            .list_documents(&[DocumentQuery::equal(TERM_FIELD, term)])
            .await?;

        if let Some(doc) = existing.into_iter().next() {
            let entry = decode_entry(doc)?;
            let count = entry.count + 1;
            let mut data = Map::new();
            data.insert(COUNT_FIELD.to_string(), json!(count));
            store.update_document(&entry.id, data).await?;
            debug!(term = %term, count, "Incremented search count");
            return Ok(TrendUpdate::Incremented { count });
        }

        let mut data = Map::new();
        data.insert(TERM_FIELD.to_string(), json!(term));
        data.insert(COUNT_FIELD.to_string(), json!(1));
        data.insert("movie_id".to_string(), json!(top_movie.id));
        data.insert(
            "poster_url".to_string(),
            top_movie
                .poster_path
                .as_ref()
                .map(|p| Value::String(format!("{POSTER_BASE}{p}")))
                .unwrap_or(Value::Null),
        );
        store.create_document(data).await?;
        info!(term = %term, movie_id = top_movie.id, "Started tracking search term");
        Ok(TrendUpdate::Created)
    }

    pub async fn record_search(&self, term: &str, top_movie: &MovieRecord) {
        if !self.is_enabled() {
            warn!("Trend store not configured, skipping search count update");
            return;
        }
        if let Err(e) = self.try_record_search(term, top_movie).await {
            error!("Failed to update search count for '{}': {}", term, e);
        }
    }

    /// Runs `record_search` detached; the handle is only useful to tests.
    pub fn spawn_record_search(&self, term: String, top_movie: MovieRecord) -> JoinHandle<()> {
        let tracker = self.clone();
        tokio::spawn(async move { tracker.record_search(&term, &top_movie).await })
    }

    pub async fn try_top_trending(
        &self,
        limit: usize,
    ) -> Result<Vec<TrendingEntry>, PersistenceError> {
        let store = self.store()?;
        let docs = store
            .list_documents(&[
                DocumentQuery::Limit(limit),
                DocumentQuery::order_desc(COUNT_FIELD),
            ])
            .await?;
        let mut entries = docs
            .into_iter()
            .map(decode_entry)
            .collect::<Result<Vec<_>, _>>()?;
        // Stores may ignore ordering or limits they do not index.
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries.truncate(limit);
        Ok(entries)
    }

    pub async fn top_trending(&self, limit: usize) -> Vec<TrendingEntry> {
        if !self.is_enabled() {
            warn!("Trend store not configured, returning no trending searches");
            return Vec::new();
        }
        match self.try_top_trending(limit).await {
            Ok(entries) => entries,
            Err(e) => {
                error!("Failed to fetch trending searches: {}", e);
                Vec::new()
            }
        }
    }
}

fn decode_entry(doc: Document) -> Result<TrendingEntry, PersistenceError> {
    let stored: StoredTrend = serde_json::from_value(Value::Object(doc.data))?;
    Ok(TrendingEntry {
        id: doc.id,
        search_term: stored.search_term,
        count: stored.count,
        movie_id: stored.movie_id,
        poster_url: stored.poster_url,
    })
}
