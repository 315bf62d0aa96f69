//! In-memory backend with scripted replies.
//!
//! Used to drive the store without a network: each call pops the next queued
//! reply for its operation. A reply can also be deferred and resolved later
//! through a channel, which lets callers control completion order of
//! concurrent requests.

use crate::client::{ApiResult, PortariaApi};
use crate::types::{AskResponse, Document, SearchResponse};
use portaria_core::ApiError;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

/// A call received by [`ScriptedApi`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedCall {
    Ask(String),
    Search(String),
    GetDocument(String),
}

enum Reply<T> {
    Ready(ApiResult<T>),
    Deferred(oneshot::Receiver<ApiResult<T>>),
}

impl<T> Reply<T> {
    async fn resolve(self) -> ApiResult<T> {
        match self {
            Reply::Ready(result) => result,
            Reply::Deferred(receiver) => receiver
                .await
                .unwrap_or_else(|_| Err(ApiError::Unknown("Deferred reply dropped".to_string()))),
        }
    }
}

#[derive(Default)]
struct Script {
    ask: VecDeque<Reply<AskResponse>>,
    search: VecDeque<Reply<SearchResponse>>,
    documents: VecDeque<Reply<Document>>,
    calls: Vec<ScriptedCall>,
}

/// Backend whose replies are queued ahead of time.
#[derive(Default)]
pub struct ScriptedApi {
    script: Mutex<Script>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue the reply for the next `ask` call.
    pub fn push_ask(&self, reply: ApiResult<AskResponse>) -> &Self {
        self.script().ask.push_back(Reply::Ready(reply));
        self
    }

    /// Queue the reply for the next `search` call.
    pub fn push_search(&self, reply: ApiResult<SearchResponse>) -> &Self {
        self.script().search.push_back(Reply::Ready(reply));
        self
    }

    /// Queue the reply for the next `get_document` call.
    pub fn push_document(&self, reply: ApiResult<Document>) -> &Self {
        self.script().documents.push_back(Reply::Ready(reply));
        self
    }

    /// Queue an `ask` reply that completes when the returned sender fires.
    pub fn defer_ask(&self) -> oneshot::Sender<ApiResult<AskResponse>> {
        let (tx, rx) = oneshot::channel();
        self.script().ask.push_back(Reply::Deferred(rx));
        tx
    }

    /// Queue a `search` reply that completes when the returned sender fires.
    pub fn defer_search(&self) -> oneshot::Sender<ApiResult<SearchResponse>> {
        let (tx, rx) = oneshot::channel();
        self.script().search.push_back(Reply::Deferred(rx));
        tx
    }

    /// Queue a `get_document` reply that completes when the returned sender fires.
    pub fn defer_document(&self) -> oneshot::Sender<ApiResult<Document>> {
        let (tx, rx) = oneshot::channel();
        self.script().documents.push_back(Reply::Deferred(rx));
        tx
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<ScriptedCall> {
        self.script().calls.clone()
    }
}

fn exhausted<T>(operation: &str) -> Reply<T> {
    Reply::Ready(Err(ApiError::Unknown(format!(
        "No scripted reply left for {}",
        operation
    ))))
}

#[async_trait::async_trait]
impl PortariaApi for ScriptedApi {
    fn backend_name(&self) -> &str {
        "scripted"
    }

    async fn ask(&self, question: &str) -> ApiResult<AskResponse> {
        let reply = {
            let mut script = self.script();
            script.calls.push(ScriptedCall::Ask(question.to_string()));
            script.ask.pop_front().unwrap_or_else(|| exhausted("ask"))
        };
        reply.resolve().await
    }

    async fn search(&self, query: &str) -> ApiResult<SearchResponse> {
        let reply = {
            let mut script = self.script();
            script.calls.push(ScriptedCall::Search(query.to_string()));
            script.search.pop_front().unwrap_or_else(|| exhausted("search"))
        };
        reply.resolve().await
    }

    async fn get_document(&self, id: &str) -> ApiResult<Document> {
        let reply = {
            let mut script = self.script();
            script.calls.push(ScriptedCall::GetDocument(id.to_string()));
            script
                .documents
                .pop_front()
                .unwrap_or_else(|| exhausted("get_document"))
        };
        reply.resolve().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceRef;

    #[tokio::test]
    async fn test_replies_in_queue_order() {
        let api = ScriptedApi::new();
        api.push_ask(Ok(AskResponse {
            answer: "primeira".to_string(),
            sources: vec![SourceRef::new("1", "Portaria 1")],
        }))
        .push_ask(Err(ApiError::Server(500)));

        assert_eq!(api.ask("a").await.unwrap().answer, "primeira");
        assert_eq!(api.ask("b").await.unwrap_err(), ApiError::Server(500));
        assert_eq!(
            api.calls(),
            vec![
                ScriptedCall::Ask("a".to_string()),
                ScriptedCall::Ask("b".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_exhausted_script_is_unknown_error() {
        let api = ScriptedApi::new();
        assert!(matches!(
            api.search("nada").await,
            Err(ApiError::Unknown(_))
        ));
    }

    #[tokio::test]
    async fn test_deferred_reply() {
        let api = ScriptedApi::new();
        let tx = api.defer_document();
        tx.send(Ok(Document {
            id: "42".to_string(),
            title: "Portaria 42".to_string(),
            content: "Art. 1º".to_string(),
        }))
        .unwrap();

        assert_eq!(api.get_document("42").await.unwrap().id, "42");
    }

    #[tokio::test]
    async fn test_dropped_deferred_reply() {
        let api = ScriptedApi::new();
        drop(api.defer_search());
        assert!(matches!(
            api.search("x").await,
            Err(ApiError::Unknown(_))
        ));
    }
}
