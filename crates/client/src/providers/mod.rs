//! Backend implementations.

pub mod http;
pub mod scripted;

pub use http::HttpBackend;
pub use scripted::{ScriptedApi, ScriptedCall};
