//! HTTP backend implementation.
//!
//! Endpoints:
//! - `POST {base}/ask` with `{ "question": ... }`
//! - `POST {base}/search` with `{ "query": ... }`
//! - `GET {base}/document/{id}`

use crate::client::{ApiResult, PortariaApi};
use crate::types::{AskRequest, AskResponse, Document, ErrorBody, SearchRequest, SearchResponse};
use portaria_core::{ApiError, AppError, AppResult};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;

/// Client for the RAG backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    /// Base URL, e.g. `http://localhost:5000` or `https://host/api`
    base_url: Url,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpBackend {
    /// Create a backend client for the given base URL.
    pub fn with_base_url(base_url: &str) -> AppResult<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a backend client reusing an existing `reqwest::Client`.
    pub fn with_client(base_url: &str, client: reqwest::Client) -> AppResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("Invalid API URL {:?}: {}", base_url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "API URL cannot be used as a base: {}",
                base_url
            )));
        }

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        join_segments(&self.base_url, segments)
    }
}

pub(crate) fn join_segments(base: &Url, segments: &[&str]) -> ApiResult<Url> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| ApiError::Unknown(format!("Cannot append path to {}", base)))?;
        path.pop_if_empty();
        path.extend(segments);
    }
    Ok(url)
}

/// Decode a success body, or map the failure status to an [`ApiError`].
///
/// With `read_error_body`, a `{ "error": "..." }` payload on a failure status
/// becomes [`ApiError::Application`].
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    read_error_body: bool,
) -> ApiResult<T> {
    let status = response.status();

    if !status.is_success() {
        let code = status.as_u16();
        if !read_error_body {
            return Err(ApiError::Server(code));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.trim().is_empty());

        return Err(match message {
            Some(message) => ApiError::Application {
                status: code,
                message,
            },
            None => ApiError::Server(code),
        });
    }

    response.json::<T>().await.map_err(|e| {
        if e.is_decode() {
            ApiError::Unknown(format!("Malformed response body: {}", e))
        } else {
            ApiError::from(e)
        }
    })
}

#[async_trait::async_trait]
impl PortariaApi for HttpBackend {
    fn backend_name(&self) -> &str {
        "http"
    }

    async fn ask(&self, question: &str) -> ApiResult<AskResponse> {
        let url = self.endpoint(&["ask"])?;
        tracing::info!("Sending question to {}", url);

        let body = AskRequest {
            question: question.to_string(),
        };

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Ask request failed before a response: {}", e);
                ApiError::from(e)
            })?;

        let answer: AskResponse = read_json(response, true).await?;
        tracing::debug!("Received answer with {} sources", answer.sources.len());
        Ok(answer)
    }

    async fn search(&self, query: &str) -> ApiResult<SearchResponse> {
        let url = self.endpoint(&["search"])?;
        tracing::info!("Sending semantic search to {}", url);

        let body = SearchRequest {
            query: query.to_string(),
        };

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Search request failed before a response: {}", e);
                ApiError::from(e)
            })?;

        let results: SearchResponse = read_json(response, true).await?;
        tracing::debug!("Search returned {} results", results.results.len());
        Ok(results)
    }

    async fn get_document(&self, id: &str) -> ApiResult<Document> {
        let url = self.endpoint(&["document", id])?;
        tracing::info!("Fetching document {}", id);

        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::warn!("Document request failed before a response: {}", e);
            ApiError::from(e)
        })?;

        read_json(response, true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let backend = HttpBackend::with_base_url("https://example.com/api/").unwrap();
        let url = backend.endpoint(&["ask"]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/ask");
    }

    #[test]
    fn test_endpoint_encodes_document_id() {
        let backend = HttpBackend::with_base_url("http://localhost:5000").unwrap();
        let url = backend.endpoint(&["document", "portaria 12/2023"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/document/portaria%2012%2F2023"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(HttpBackend::with_base_url("not a url").is_err());
        assert!(HttpBackend::with_base_url("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_backend_name() {
        let backend = HttpBackend::with_base_url("http://localhost:5000").unwrap();
        assert_eq!(backend.backend_name(), "http");
    }
}
