//! Document command handler.

use super::{build_store, print_json};
use clap::Args;
use portaria_core::{config::AppConfig, AppError, AppResult};
use portaria_render::{format_and_render, format_portaria_id};

/// Print the full content of a document
#[derive(Args, Debug)]
pub struct DocumentCommand {
    /// Document id, as listed in sources and search results
    pub id: String,

    /// Print the content as sanitized HTML
    #[arg(long, conflicts_with = "json")]
    pub html: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl DocumentCommand {
    /// Execute the document command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing document command for {}", self.id);

        let store = build_store(config)?;
        let document = match store.fetch_document(&self.id).await {
            Some(document) => document,
            None => {
                let message = store
                    .snapshot()
                    .fetch
                    .error
                    .unwrap_or_else(|| format!("Document {} not found", self.id));
                return Err(AppError::Other(message));
            }
        };

        if self.json {
            print_json(&document)
        } else if self.html {
            print!("{}", format_and_render(&document.content));
            Ok(())
        } else {
            println!("{} [{}]\n", document.title, format_portaria_id(&document.id));
            println!("{}", document.content);
            Ok(())
        }
    }
}
