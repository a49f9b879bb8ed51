use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::error::PersistenceError;

/// The subset of document-store queries the trend tracker relies on.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentQuery {
    Equal { attribute: String, value: Value },
    OrderDesc { attribute: String },
    Limit(usize),
}

impl DocumentQuery {
    pub fn equal(attribute: &str, value: impl Into<Value>) -> Self {
        DocumentQuery::Equal {
            attribute: attribute.to_string(),
            value: value.into(),
        }
    }

    pub fn order_desc(attribute: &str) -> Self {
        DocumentQuery::OrderDesc {
            attribute: attribute.to_string(),
        }
    }

    /// Appwrite's JSON query syntax, as sent in `queries[]`.
    pub fn to_wire(&self) -> String {
        match self {
            DocumentQuery::Equal { attribute, value } => json!({
                "method": "equal",
                "attribute": attribute,
                "values": [value],
            }),
            DocumentQuery::OrderDesc { attribute } => json!({
                "method": "orderDesc",
                "attribute": attribute,
            }),
            DocumentQuery::Limit(limit) => json!({
                "method": "limit",
                "values": [limit],
            }),
        }
        .to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Map<String, Value>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_documents(
        &self,
        queries: &[DocumentQuery],
    ) -> Result<Vec<Document>, PersistenceError>;
    async fn create_document(&self, data: Map<String, Value>)
        -> Result<Document, PersistenceError>;
    async fn update_document(
        &self,
        document_id: &str,
        data: Map<String, Value>,
    ) -> Result<Document, PersistenceError>;
}
