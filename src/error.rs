use thiserror::Error;

const NETWORK_MESSAGE: &str = "Failed to fetch movies. Please try again later.";
const CONFIG_MESSAGE: &str =
    "API key is not configured. Please add your TMDB API key to the .env file.";
const API_FALLBACK_MESSAGE: &str = "Failed to fetch movies";

/// Failures on the catalog path. These end the current fetch and are shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog credential is not configured")]
    Config,

    #[error("catalog request failed: {0}")]
    Network(String),

    #[error("catalog reported an error: {}", .message.as_deref().unwrap_or("no message"))]
    Api { message: Option<String> },
}

impl CatalogError {
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::Config => CONFIG_MESSAGE.to_string(),
            CatalogError::Network(_) => NETWORK_MESSAGE.to_string(),
            CatalogError::Api { message } => message
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(API_FALLBACK_MESSAGE)
                .to_string(),
        }
    }
}

/// Failures talking to the document store. Never leave the trend tracker.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("document store is not configured")]
    NotConfigured,

    #[error("document store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("document store returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("document is missing its id")]
    MissingId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_message_is_surfaced_verbatim() {
        let err = CatalogError::Api {
            message: Some("Invalid API key: You must be granted a valid key.".to_string()),
        };
        assert_eq!(
            err.user_message(),
            "Invalid API key: You must be granted a valid key."
        );
        let blank = CatalogError::Api {
            message: Some("  ".to_string()),
        };
        assert_eq!(blank.user_message(), "Failed to fetch movies");
    }

    #[test]
    fn network_detail_stays_out_of_user_message() {
        let err = CatalogError::Network("http://x -> 500 boom".to_string());
        assert_eq!(
            err.user_message(),
            "Failed to fetch movies. Please try again later."
        );
        assert!(err.to_string().contains("500 boom"));
    }
}
