//! Command handlers for the Portaria CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod chat;
pub mod document;
pub mod legacy;
pub mod render;
pub mod search;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use document::DocumentCommand;
pub use legacy::LegacySearchCommand;
pub use render::RenderCommand;
pub use search::SearchCommand;

use portaria_client::{create_client, SourceRef};
use portaria_core::{config::AppConfig, AppResult};
use portaria_render::format_portaria_id;
use portaria_store::PortariaStore;
use serde::Serialize;

/// Build a store backed by the configured backend.
pub(crate) fn build_store(config: &AppConfig) -> AppResult<PortariaStore> {
    let api = create_client(config)?;
    Ok(PortariaStore::new(api))
}

/// Print a value as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// One line per source, with the display form of its id.
pub(crate) fn format_sources(sources: &[SourceRef]) -> String {
    sources
        .iter()
        .map(|source| format!("  - {} [{}]", source.title, format_portaria_id(&source.id)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sources() {
        let sources = vec![
            SourceRef::new("portaria_12_2023_page1.txt", "Portaria 12/2023"),
            SourceRef::new("p7", "Portaria 7"),
        ];
        assert_eq!(
            format_sources(&sources),
            "  - Portaria 12/2023 [portaria_12_2023]\n  - Portaria 7 [p7]"
        );
    }

    #[test]
    fn test_build_store_rejects_bad_url() {
        let mut config = AppConfig::default();
        config.api_url = "ftp://rag".to_string();
        assert!(build_store(&config).is_err());
    }
}
