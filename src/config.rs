use std::env;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_TMDB_BASE: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_APPWRITE_ENDPOINT: &str = "https://fra.cloud.appwrite.io/v1";
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct TrendStoreConfig {
    pub endpoint: String,
    pub project_id: Option<String>,
    pub database_id: Option<String>,
    pub collection_id: Option<String>,
    pub api_key: Option<String>,
}

impl TrendStoreConfig {
    /// Names of the identifiers that are still unset.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.project_id.is_none() {
            missing.push("APPWRITE_PROJECT_ID");
        }
        if self.database_id.is_none() {
            missing.push("APPWRITE_DATABASE_ID");
        }
        if self.collection_id.is_none() {
            missing.push("APPWRITE_COLLECTION_ID");
        }
        missing
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub trends: TrendStoreConfig,
    pub debounce: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let debounce_ms = match get("SEARCH_DEBOUNCE_MS") {
            Some(raw) => raw.parse::<u64>().unwrap_or_else(|_| {
                warn!(
                    "Ignoring invalid SEARCH_DEBOUNCE_MS '{}', using {}ms",
                    raw, DEFAULT_DEBOUNCE_MS
                );
                DEFAULT_DEBOUNCE_MS
            }),
            None => DEFAULT_DEBOUNCE_MS,
        };

        Self {
            catalog: CatalogConfig {
                base_url: get("TMDB_BASE_URL")
                    .map(|u| u.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_TMDB_BASE.to_string()),
                api_key: get("TMDB_API_KEY"),
                connect_timeout: Duration::from_secs(5),
                request_timeout: Duration::from_secs(30),
            },
            trends: TrendStoreConfig {
                endpoint: get("APPWRITE_ENDPOINT")
                    .map(|u| u.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_APPWRITE_ENDPOINT.to_string()),
                project_id: get("APPWRITE_PROJECT_ID"),
                database_id: get("APPWRITE_DATABASE_ID"),
                collection_id: get("APPWRITE_COLLECTION_ID"),
                api_key: get("APPWRITE_API_KEY"),
            },
            debounce: Duration::from_millis(debounce_ms),
        }
    }

    /// Logs what is missing. Absent values degrade features, they never abort startup.
    pub fn report(&self) {
        if self.catalog.api_key.is_some() {
            info!("TMDB credential is set ({})", self.catalog.base_url);
        } else {
            warn!("TMDB_API_KEY is not set - catalog fetches will report a configuration error");
        }
        let missing = self.trends.missing();
        if missing.is_empty() {
            info!("Trend tracking enabled ({})", self.trends.endpoint);
        } else {
            warn!(
                "Trend tracking disabled, missing: {}",
                missing.join(", ")
            );
        }
        info!("Search debounce: {}ms", self.debounce.as_millis());
    }
}
