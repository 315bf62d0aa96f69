//! Portaria Store
//!
//! The orchestration core of the assistant: conversation history, search
//! results, the selected document and per-request loading and error state,
//! driven through a [`portaria_client::PortariaApi`] backend.
//!
//! # Example
//! ```
//! use portaria_client::{AskResponse, ScriptedApi, SourceRef};
//! use portaria_store::PortariaStore;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let api = Arc::new(ScriptedApi::new());
//! api.push_ask(Ok(AskResponse {
//!     answer: "A portaria 12 trata de férias.".to_string(),
//!     sources: vec![SourceRef::new("portaria_12", "Portaria 12")],
//! }));
//!
//! let store = PortariaStore::new(api);
//! store.submit_question("Do que trata a portaria 12?").await;
//! assert_eq!(store.latest_sources().len(), 1);
//! # }
//! ```

pub mod pagination;
pub mod state;
pub mod store;

pub use pagination::Pagination;
pub use state::{ConversationEntry, RequestState, Role, StoreState};
pub use store::{
    PortariaStore, ASK_FAILED_MESSAGE, DOCUMENT_FAILED_MESSAGE, SEARCH_FAILED_MESSAGE,
};
