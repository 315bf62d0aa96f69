//! The conversation and search store.
//!
//! [`PortariaStore`] sequences every backend call and owns the state the
//! presentation layer renders. Each operation runs the same steps: mark the
//! request loading, apply the optimistic mutation, await the backend, record
//! the result or error, clear loading. Failures never escape; they become
//! state.
//!
//! State lives in a [`tokio::sync::watch`] channel. Every mutation is a short
//! `send_modify` call, never held across an await, and notifies subscribers.

use crate::state::{ConversationEntry, StoreState};
use portaria_client::{Document, PortariaApi, SourceRef};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Shown when asking fails without a backend message.
pub const ASK_FAILED_MESSAGE: &str = "Não foi possível obter uma resposta. Tente novamente.";

/// Shown when searching fails without a backend message.
pub const SEARCH_FAILED_MESSAGE: &str = "Não foi possível realizar a busca. Tente novamente.";

/// Shown whenever a document fails to load.
pub const DOCUMENT_FAILED_MESSAGE: &str = "Falha ao carregar o conteúdo da portaria.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    Search,
    Fetch,
}

/// Orchestrates backend calls and owns the application state.
///
/// Share it behind an `Arc`; all operations take `&self`.
pub struct PortariaStore {
    api: Arc<dyn PortariaApi>,
    state: watch::Sender<StoreState>,
    asks_in_flight: AtomicUsize,
    search_generation: AtomicU64,
    fetch_generation: AtomicU64,
}

/// Clears the loading flag of a request when dropped, including when the
/// operation's future is dropped mid-flight.
struct LoadingGuard<'a> {
    store: &'a PortariaStore,
    kind: Option<(RequestKind, u64)>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let store = self.store;
        match self.kind {
            None => store.state.send_modify(|state| {
                let remaining = store
                    .asks_in_flight
                    .fetch_sub(1, Ordering::SeqCst)
                    .saturating_sub(1);
                state.ask.loading = remaining > 0;
            }),
            Some((kind, generation)) => store.state.send_modify(|state| {
                if store.is_latest(kind, generation) {
                    match kind {
                        RequestKind::Search => state.search.loading = false,
                        RequestKind::Fetch => state.fetch.loading = false,
                    }
                }
            }),
        }
    }
}

impl PortariaStore {
    pub fn new(api: Arc<dyn PortariaApi>) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self {
            api,
            state,
            asks_in_flight: AtomicUsize::new(0),
            search_generation: AtomicU64::new(0),
            fetch_generation: AtomicU64::new(0),
        }
    }

    pub fn api(&self) -> &Arc<dyn PortariaApi> {
        &self.api
    }

    /// Receiver notified after every state mutation.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    /// Sources of the most recent answer that carries any.
    pub fn latest_sources(&self) -> Vec<SourceRef> {
        self.state.borrow().latest_sources().to_vec()
    }

    fn generation(&self, kind: RequestKind) -> &AtomicU64 {
        match kind {
            RequestKind::Search => &self.search_generation,
            RequestKind::Fetch => &self.fetch_generation,
        }
    }

    fn is_latest(&self, kind: RequestKind, generation: u64) -> bool {
        self.generation(kind).load(Ordering::SeqCst) == generation
    }

    /// Ask a question and append the exchange to the conversation.
    ///
    /// The user entry is appended before the backend is called. On success an
    /// assistant entry with the answer and its sources follows; on failure an
    /// error entry with the user-facing message, which is also recorded as the
    /// ask error. Blank questions are ignored.
    pub async fn submit_question(&self, question: &str) {
        if question.trim().is_empty() {
            tracing::debug!("Ignoring blank question");
            return;
        }

        self.state.send_modify(|state| {
            self.asks_in_flight.fetch_add(1, Ordering::SeqCst);
            state.ask.begin();
            state.conversation.push(ConversationEntry::user(question));
        });
        let _guard = LoadingGuard {
            store: self,
            kind: None,
        };

        tracing::info!("Submitting question via {} backend", self.api.backend_name());

        match self.api.ask(question).await {
            Ok(response) => {
                tracing::debug!(
                    "Answer received with {} sources",
                    response.sources.len()
                );
                self.state.send_modify(|state| {
                    state
                        .conversation
                        .push(ConversationEntry::assistant(response.answer, response.sources));
                });
            }
            Err(e) => {
                tracing::warn!("Question failed: {:?}", e);
                let message = e.user_message(ASK_FAILED_MESSAGE);
                self.state.send_modify(|state| {
                    state.ask.error = Some(message.clone());
                    state.conversation.push(ConversationEntry::error(message));
                });
            }
        }
    }

    /// Load a document and make it the selected one.
    ///
    /// Returns the document, or `None` when loading failed (the failure is
    /// recorded as the fetch error). Only the most recently issued fetch may
    /// change the selection.
    pub async fn fetch_document(&self, id: &str) -> Option<Document> {
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.fetch_generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.fetch.begin();
            state.selected_document = None;
        });
        let _guard = LoadingGuard {
            store: self,
            kind: Some((RequestKind::Fetch, generation)),
        };

        tracing::info!("Fetching document {}", id);

        match self.api.get_document(id).await {
            Ok(document) => {
                self.state.send_modify(|state| {
                    if self.is_latest(RequestKind::Fetch, generation) {
                        state.selected_document = Some(document.clone());
                    } else {
                        tracing::debug!("Discarding stale document {}", document.id);
                    }
                });
                Some(document)
            }
            Err(e) => {
                tracing::warn!("Failed to fetch document {}: {:?}", id, e);
                self.state.send_modify(|state| {
                    if self.is_latest(RequestKind::Fetch, generation) {
                        state.fetch.error = Some(DOCUMENT_FAILED_MESSAGE.to_string());
                    }
                });
                None
            }
        }
    }

    /// Drop the selected document.
    pub fn clear_selection(&self) {
        self.state.send_modify(|state| state.selected_document = None);
    }

    /// Run a semantic search, replacing previous results.
    ///
    /// Blank queries are ignored. Only the most recently issued search may
    /// write results or errors.
    pub async fn perform_search(&self, query: &str) {
        if query.trim().is_empty() {
            tracing::debug!("Ignoring blank search query");
            return;
        }

        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.search_generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.search.begin();
            state.search_results.clear();
        });
        let _guard = LoadingGuard {
            store: self,
            kind: Some((RequestKind::Search, generation)),
        };

        tracing::info!("Searching for {:?}", query);

        let outcome = self.api.search(query).await;
        self.state.send_modify(|state| {
            if !self.is_latest(RequestKind::Search, generation) {
                tracing::debug!("Discarding stale search results for {:?}", query);
                return;
            }
            match outcome {
                Ok(response) => {
                    tracing::debug!("Search returned {} results", response.results.len());
                    state.search_results = response.results;
                }
                Err(e) => {
                    tracing::warn!("Search failed: {:?}", e);
                    state.search.error = Some(e.user_message(SEARCH_FAILED_MESSAGE));
                }
            }
        });
    }
}
