//! Direct queries against the legacy document store.
//!
//! Before the RAG backend existed, portarias were looked up with a Mango
//! `_find` query: a case-insensitive regex over `content` or `title`, capped
//! at 50 documents.

use crate::client::ApiResult;
use crate::providers::http::{join_segments, read_json};
use portaria_core::{ApiError, AppError, AppResult, LegacyStoreConfig};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Maximum number of documents a legacy query returns.
pub const LEGACY_RESULT_LIMIT: u32 = 50;

/// Fields projected by the legacy query.
pub const LEGACY_FIELDS: [&str; 3] = ["_id", "title", "content"];

/// A document as stored in the legacy store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyDocument {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct FindResponse {
    #[serde(default)]
    docs: Vec<LegacyDocument>,
}

/// Selector matching `content` or `title` against `(?i)<term>`.
///
/// The term is interpolated as-is, so regex metacharacters in it keep their
/// meaning.
pub fn legacy_selector(term: &str) -> Value {
    let pattern = format!("(?i){}", term);
    json!({
        "$or": [
            { "content": { "$regex": pattern } },
            { "title": { "$regex": pattern } }
        ]
    })
}

/// Full `_find` request body for a search term.
pub fn find_query(term: &str) -> Value {
    json!({
        "selector": legacy_selector(term),
        "limit": LEGACY_RESULT_LIMIT,
        "fields": LEGACY_FIELDS,
    })
}

/// Client for `POST {url}/{database}/_find`.
#[derive(Debug, Clone)]
pub struct LegacyStoreClient {
    find_url: Url,
    username: Option<String>,
    password: Option<String>,
    client: reqwest::Client,
}

impl LegacyStoreClient {
    pub fn new(config: &LegacyStoreConfig) -> AppResult<Self> {
        let base = Url::parse(&config.url).map_err(|e| {
            AppError::Config(format!("Invalid legacy store URL {:?}: {}", config.url, e))
        })?;

        let find_url = join_segments(&base, &[config.database.as_str(), "_find"])
            .map_err(|e| AppError::Config(format!("Invalid legacy store URL: {:?}", e)))?;

        Ok(Self {
            find_url,
            username: config.username.clone(),
            password: config.password.clone(),
            client: reqwest::Client::new(),
        })
    }

    pub fn find_url(&self) -> &Url {
        &self.find_url
    }

    /// Search portarias whose title or content matches `term`, ignoring case.
    pub async fn search_portarias(&self, term: &str) -> ApiResult<Vec<LegacyDocument>> {
        tracing::info!("Querying legacy store at {} for {:?}", self.find_url, term);

        let mut request = self.client.post(self.find_url.clone()).json(&find_query(term));
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!("Legacy query failed before a response: {}", e);
            ApiError::from(e)
        })?;

        let found: FindResponse = read_json(response, false).await?;
        tracing::debug!("Legacy store returned {} documents", found.docs.len());
        Ok(found.docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_is_case_insensitive_or_over_two_fields() {
        let query = find_query("café");

        assert_eq!(query["limit"], 50);
        let branches = query["selector"]["$or"].as_array().unwrap();
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0]["content"]["$regex"], "(?i)café");
        assert_eq!(branches[1]["title"]["$regex"], "(?i)café");
        assert_eq!(query["fields"], json!(["_id", "title", "content"]));
    }

    #[test]
    fn test_find_url_from_config() {
        let client = LegacyStoreClient::new(&LegacyStoreConfig {
            url: "http://couch:5984/".to_string(),
            database: "portarias".to_string(),
            username: None,
            password: None,
        })
        .unwrap();

        assert_eq!(client.find_url().as_str(), "http://couch:5984/portarias/_find");
    }

    #[test]
    fn test_invalid_legacy_url() {
        let result = LegacyStoreClient::new(&LegacyStoreConfig {
            url: "couch".to_string(),
            database: "portarias".to_string(),
            username: None,
            password: None,
        });
        assert!(result.is_err());
    }
}
