use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::models::MovieRecord;

const TELUGU: &str = "te";
const REGION: &str = "IN";

#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Discover popular Telugu titles for an empty query, text search otherwise.
    async fn fetch_catalog(&self, query: &str) -> Result<Vec<MovieRecord>, CatalogError>;
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl TmdbClient {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let user_agent = format!("tfi-finder/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn discover_url(&self) -> String {
        format!(
            "{}/discover/movie?include_adult=false&include_video=false&language=en-US&page=1&sort_by=popularity.desc&with_original_language={TELUGU}&region={REGION}",
            self.base_url
        )
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search/movie?query={}&include_adult=false&language=en-US&page=1&region={REGION}",
            self.base_url,
            urlencoding::encode(query)
        )
    }

    fn catalog_url(&self, query: &str) -> String {
        if query.trim().is_empty() {
            self.discover_url()
        } else {
            self.search_url(query)
        }
    }
}

#[async_trait]
impl CatalogApi for TmdbClient {
    async fn fetch_catalog(&self, query: &str) -> Result<Vec<MovieRecord>, CatalogError> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("TMDB credential is missing, not sending catalog request");
            return Err(CatalogError::Config);
        };

        let url = self.catalog_url(query);
        debug!(url = %url, "Fetching catalog");
        let res = self
            .client
            .get(&url)
            .bearer_auth(api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| CatalogError::Network(format!("request failed: {e}")))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| CatalogError::Network(format!("reading body failed: {e}")))?;
        if !status.is_success() {
            return Err(CatalogError::Network(format!("{url} -> {status}: {text}")));
        }
        parse_catalog_body(&text)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogEnvelope {
    #[serde(rename = "Response")]
    response: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
    success: Option<bool>,
    status_message: Option<String>,
    results: Option<Vec<MovieRecord>>,
}

fn parse_catalog_body(text: &str) -> Result<Vec<MovieRecord>, CatalogError> {
    let envelope: CatalogEnvelope = serde_json::from_str(text)
        .map_err(|e| CatalogError::Network(format!("JSON parse failed: {e}")))?;

    if envelope
        .response
        .as_deref()
        .is_some_and(|r| r.eq_ignore_ascii_case("false"))
    {
        return Err(CatalogError::Api {
            message: envelope.error,
        });
    }
    if envelope.success == Some(false) {
        return Err(CatalogError::Api {
            message: envelope.status_message,
        });
    }

    envelope
        .results
        .ok_or_else(|| CatalogError::Network("response has no results array".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client(base: &str) -> TmdbClient {
        TmdbClient::new(&CatalogConfig {
            base_url: base.to_string(),
            api_key: Some("token".to_string()),
            connect_timeout: Duration::from_secs(1),
            request_timeout: Duration::from_secs(1),
        })
        .expect("client builds")
    }

    #[test]
    fn blank_query_uses_discover_with_telugu_filter() {
        let url = client("https://api.example/3/").catalog_url("   ");
        assert!(url.starts_with("https://api.example/3/discover/movie?"));
        assert!(url.contains("with_original_language=te"));
        assert!(url.contains("sort_by=popularity.desc"));
        assert!(url.contains("region=IN"));
    }

    #[test]
    fn search_keeps_the_raw_query() {
        let url = client("https://api.example/3").catalog_url(" Pushpa 2 ");
        assert!(url.starts_with("https://api.example/3/search/movie?"));
        assert!(url.contains("query=%20Pushpa%202%20&"));
        assert!(url.contains("include_adult=false"));
        assert!(url.contains("page=1"));
    }

    #[test]
    fn parses_results() {
        let body = r#"{"page":1,"results":[{"id":7,"title":"Eega","original_language":"te"}]}"#;
        let movies = parse_catalog_body(body).expect("results");
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].id, 7);
    }

    #[test]
    fn response_false_envelope_is_an_api_error() {
        let body = r#"{"Response":"False","Error":"Movie not found!"}"#;
        assert_eq!(
            parse_catalog_body(body),
            Err(CatalogError::Api {
                message: Some("Movie not found!".to_string())
            })
        );
    }

    #[test]
    fn tmdb_failure_envelope_is_an_api_error() {
        let body = r#"{"success":false,"status_code":7,"status_message":"Invalid API key"}"#;
        assert_eq!(
            parse_catalog_body(body),
            Err(CatalogError::Api {
                message: Some("Invalid API key".to_string())
            })
        );
    }

    #[test]
    fn garbage_body_is_a_network_error() {
        assert!(matches!(
            parse_catalog_body("<html>"),
            Err(CatalogError::Network(_))
        ));
        assert!(matches!(
            parse_catalog_body("{}"),
            Err(CatalogError::Network(_))
        ));
    }
}
