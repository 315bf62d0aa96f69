//! Render command handler.
//!
//! Reads markdown from stdin and writes sanitized HTML to stdout.

use clap::Args;
use portaria_core::AppResult;
use portaria_render::{format_and_render, render};
use tokio::io::AsyncReadExt;

/// Render markdown from stdin to sanitized HTML
#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Normalize loosely formatted text before rendering
    #[arg(long)]
    pub normalize: bool,
}

impl RenderCommand {
    /// Execute the render command.
    pub async fn execute(&self) -> AppResult<()> {
        let mut input = String::new();
        tokio::io::stdin().read_to_string(&mut input).await?;
        tracing::debug!("Rendering {} bytes of input", input.len());

        print!("{}", self.convert(&input));
        Ok(())
    }

    fn convert(&self, input: &str) -> String {
        if self.normalize {
            format_and_render(input)
        } else {
            render(input)
        }
    }
}
