//! Backend client abstraction.
//!
//! The store talks to the backend only through [`PortariaApi`], so any
//! implementation (HTTP, scripted) can drive it.

use crate::types::{AskResponse, Document, SearchResponse};
use portaria_core::ApiError;

/// Result of a single backend call.
pub type ApiResult<T> = Result<T, ApiError>;

/// Operations offered by the RAG backend.
///
/// Every call is a single attempt: no retry, no caching, no shared state
/// between calls.
#[async_trait::async_trait]
pub trait PortariaApi: Send + Sync {
    /// Short name of the implementation, used in logs.
    fn backend_name(&self) -> &str;

    /// Ask a natural-language question; returns the answer and cited sources.
    async fn ask(&self, question: &str) -> ApiResult<AskResponse>;

    /// Semantic search over the corpus.
    async fn search(&self, query: &str) -> ApiResult<SearchResponse>;

    /// Fetch the full content of one document.
    async fn get_document(&self, id: &str) -> ApiResult<Document>;
}
