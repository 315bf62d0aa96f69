//! Ask command handler.
//!
//! Sends one question through the store and prints the answer with its
//! sources.

use super::{build_store, format_sources, print_json};
use clap::Args;
use portaria_core::{config::AppConfig, AppError, AppResult};
use portaria_render::format_and_render;
use portaria_store::Role;

/// Ask a question about the portarias
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    #[arg(required = true)]
    pub question: Vec<String>,

    /// Print the answer as sanitized HTML instead of markdown
    #[arg(long, conflicts_with = "json")]
    pub html: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let question = self.question.join(" ");
        if question.trim().is_empty() {
            return Err(AppError::Config("No question provided".to_string()));
        }

        let store = build_store(config)?;
        store.submit_question(&question).await;

        let state = store.snapshot();
        if let Some(error) = state.ask.error.clone() {
            return Err(AppError::Other(error));
        }

        let answer = state
            .conversation
            .iter()
            .rev()
            .find(|entry| entry.role == Role::Assistant)
            .ok_or_else(|| AppError::Other("No answer received".to_string()))?;
        let sources = state.latest_sources();

        if self.json {
            print_json(&serde_json::json!({
                "question": question,
                "answer": answer.text,
                "sources": sources,
            }))?;
        } else {
            if self.html {
                print!("{}", format_and_render(&answer.text));
            } else {
                println!("{}", answer.text);
            }

            if !sources.is_empty() {
                println!("\nFontes:");
                println!("{}", format_sources(sources));
            }
        }

        Ok(())
    }
}
