use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::debug;

use crate::config::TrendStoreConfig;
use crate::error::PersistenceError;
use crate::store::{Document, DocumentQuery, DocumentStore};

const UNIQUE_ID: &str = "unique()";

/// Document store backed by an Appwrite database collection.
#[derive(Debug, Clone)]
pub struct AppwriteClient {
    client: Client,
    documents_url: String,
    project_id: String,
    api_key: Option<String>,
}

impl AppwriteClient {
    pub fn new(config: &TrendStoreConfig) -> Result<Self> {
        let (Some(project_id), Some(database_id), Some(collection_id)) = (
            config.project_id.clone(),
            config.database_id.as_deref(),
            config.collection_id.as_deref(),
        ) else {
            return Err(anyhow!(
                "Appwrite is not configured, missing {}",
                config.missing().join(", ")
            ));
        };

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build Appwrite HTTP client")?;
        let documents_url = format!(
            "{}/databases/{}/collections/{}/documents",
            config.endpoint.trim_end_matches('/'),
            urlencoding::encode(database_id),
            urlencoding::encode(collection_id)
        );
        Ok(Self {
            client,
            documents_url,
            project_id,
            api_key: config.api_key.clone(),
        })
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        let req = req.header("X-Appwrite-Project", &self.project_id);
        match &self.api_key {
            Some(key) => req.header("X-Appwrite-Key", key),
            None => req,
        }
    }

    async fn read_document(res: Response) -> Result<Document, PersistenceError> {
        let value: Value = read_json(res).await?;
        into_document(value)
    }
}

#[async_trait]
impl DocumentStore for AppwriteClient {
    async fn list_documents(
        &self,
        queries: &[DocumentQuery],
    ) -> Result<Vec<Document>, PersistenceError> {
        #[derive(Deserialize)]
        struct DocumentList {
            #[serde(default)]
            documents: Vec<Value>,
        }

        let params: Vec<(&str, String)> = queries
            .iter()
            .map(|q| ("queries[]", q.to_wire()))
            .collect();
        debug!(queries = params.len(), "Listing Appwrite documents");
        let res = self
            .authorized(self.client.get(&self.documents_url))
            .query(&params)
            .send()
            .await?;
        let list: DocumentList = read_json(res).await?;
        list.documents.into_iter().map(into_document).collect()
    }

    async fn create_document(
        &self,
        data: Map<String, Value>,
    ) -> Result<Document, PersistenceError> {
        let body = json!({ "documentId": UNIQUE_ID, "data": data });
        let res = self
            .authorized(self.client.post(&self.documents_url))
            .json(&body)
            .send()
            .await?;
        Self::read_document(res).await
    }

    async fn update_document(
        &self,
        document_id: &str,
        data: Map<String, Value>,
    ) -> Result<Document, PersistenceError> {
        let url = format!(
            "{}/{}",
            self.documents_url,
            urlencoding::encode(document_id)
        );
        let res = self
            .authorized(self.client.patch(&url))
            .json(&json!({ "data": data }))
            .send()
            .await?;
        Self::read_document(res).await
    }
}

async fn read_json<T: for<'de> Deserialize<'de>>(res: Response) -> Result<T, PersistenceError> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        return Err(PersistenceError::Status {
            status: status.as_u16(),
            body: text,
        });
    }
    Ok(serde_json::from_str(&text)?)
}

/// Splits an Appwrite document into its id and user attributes; `$` system fields are dropped.
fn into_document(value: Value) -> Result<Document, PersistenceError> {
    let Value::Object(map) = value else {
        return Err(PersistenceError::MissingId);
    };
    let id = map
        .get("$id")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or(PersistenceError::MissingId)?;
    let data = map
        .into_iter()
        .filter(|(k, _)| !k.starts_with('$'))
        .collect();
    Ok(Document { id, data })
}
