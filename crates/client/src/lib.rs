//! Backend client crate for the Portaria assistant.
//!
//! Wraps the calls the assistant makes to its RAG backend behind the
//! [`PortariaApi`] trait and maps every transport failure onto
//! [`portaria_core::ApiError`].
//!
//! # Backends
//! - **HTTP**: the RAG API (`/ask`, `/search`, `/document/{id}`)
//! - **Scripted**: queued in-memory replies, for tests and demos
//!
//! The [`legacy`] module queries the older document store directly.
//!
//! # Example
//! ```no_run
//! use portaria_client::{HttpBackend, PortariaApi};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = HttpBackend::with_base_url("http://localhost:5000")?;
//! let response = backend.ask("Quais portarias tratam de férias?").await?;
//! println!("{}", response.answer);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod legacy;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{ApiResult, PortariaApi};
pub use factory::{create_client, create_legacy_client};
pub use legacy::{LegacyDocument, LegacyStoreClient};
pub use providers::{HttpBackend, ScriptedApi, ScriptedCall};
pub use types::{AskResponse, Document, SearchResponse, SearchResult, SourceRef};
