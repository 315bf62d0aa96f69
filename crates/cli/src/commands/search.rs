//! Search command handler.
//!
//! Runs a semantic search and prints one page of the ranked results.

use super::{build_store, print_json};
use clap::Args;
use portaria_core::{config::AppConfig, AppError, AppResult};
use portaria_render::{format_portaria_id, truncate_text, DEFAULT_TRUNCATE_CHARS};

/// Semantic search over the portarias
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Search query
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Page to show (1-based)
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    /// Results per page
    #[arg(long, default_value_t = 10)]
    pub per_page: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    /// Execute the search command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing search command");

        let query = self.query.join(" ");
        if query.trim().is_empty() {
            return Err(AppError::Config("No search query provided".to_string()));
        }

        let store = build_store(config)?;
        store.perform_search(&query).await;

        let state = store.snapshot();
        if let Some(error) = state.search.error.clone() {
            return Err(AppError::Other(error));
        }

        let (page, results) = state.search_page(self.page, self.per_page);
        tracing::debug!(
            "Showing page {} of {} ({} results total)",
            page.current_page,
            page.total_pages,
            state.search_results.len()
        );

        if self.json {
            return print_json(&serde_json::json!({
                "query": query,
                "pagination": page,
                "results": results,
            }));
        }

        if results.is_empty() {
            println!("Nenhum resultado encontrado.");
            return Ok(());
        }

        for (offset, result) in results.iter().enumerate() {
            let score = result
                .score
                .map(|score| format!(" ({:.2})", score))
                .unwrap_or_default();
            println!(
                "{}. {} [{}]{}",
                page.start_index + offset + 1,
                result.title,
                format_portaria_id(&result.id),
                score
            );
            if let Some(snippet) = &result.snippet {
                println!("   {}", truncate_text(snippet, DEFAULT_TRUNCATE_CHARS));
            }
        }

        println!("\nPágina {} de {}", page.current_page, page.total_pages);
        if page.has_previous {
            println!("Página anterior: --page {}", page.current_page - 1);
        }
        if page.has_next {
            println!("Próxima página: --page {}", page.current_page + 1);
        }

        Ok(())
    }
}
