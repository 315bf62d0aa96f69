//! Legacy search command handler.
//!
//! Queries the old document store directly, bypassing the RAG backend.

use super::print_json;
use clap::Args;
use portaria_client::create_legacy_client;
use portaria_core::{config::AppConfig, AppError, AppResult};
use portaria_render::{format_portaria_id, truncate_text, DEFAULT_TRUNCATE_CHARS};

/// Case-insensitive search over title and content in the legacy store
#[derive(Args, Debug)]
pub struct LegacySearchCommand {
    /// Search term (interpreted as a regular expression)
    pub term: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl LegacySearchCommand {
    /// Execute the legacy search command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing legacy search command");

        let client = create_legacy_client(config)?.ok_or_else(|| {
            AppError::Config(
                "Legacy store not configured. Set COUCHDB_URL and COUCHDB_DATABASE.".to_string(),
            )
        })?;

        let documents = client.search_portarias(&self.term).await?;

        if self.json {
            return print_json(&documents);
        }

        if documents.is_empty() {
            println!("Nenhuma portaria encontrada.");
            return Ok(());
        }

        for document in &documents {
            println!("{} [{}]", document.title, format_portaria_id(&document.id));
            println!("   {}", truncate_text(&document.content, DEFAULT_TRUNCATE_CHARS));
        }

        Ok(())
    }
}
