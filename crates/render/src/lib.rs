//! Portaria Render
//!
//! Turns model answers into HTML that is safe to display: an optional
//! normalization pass for loosely formatted text, then markdown rendering
//! followed by sanitization.
//!
//! # Example
//!
//! ```
//! use portaria_render::format_and_render;
//!
//! let html = format_and_render("Resumo\n======\n* item <script>x()</script>");
//! assert!(html.contains("<h1"));
//! assert!(!html.contains("<script"));
//! ```

pub mod format;
pub mod markdown;
pub mod normalize;

pub use format::{format_portaria_id, truncate_text, DEFAULT_TRUNCATE_CHARS};
pub use markdown::{render, sanitize, slugify};
pub use normalize::normalize;

/// Normalize loosely structured text, then render and sanitize it.
pub fn format_and_render(text: &str) -> String {
    render(&normalize(text))
}
