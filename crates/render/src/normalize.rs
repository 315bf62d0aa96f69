//! Plain-text to markdown normalization.
//!
//! Answers from the model arrive as anything between loose plain text and
//! proper markdown. This pass applies an ordered table of rewrite rules to
//! coax the loose forms into markdown before rendering. Every rule is
//! best-effort: text a rule does not recognize passes through untouched, and
//! fenced code blocks are never rewritten.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

/// How a matched pattern is rewritten.
#[derive(Clone, Copy)]
enum Rewrite {
    /// `regex` replacement template (`$1` etc.)
    Template(&'static str),
    /// Computed replacement
    With(fn(&Captures<'_>) -> String),
}

/// One normalization rule.
struct Rule {
    name: &'static str,
    pattern: Regex,
    rewrite: Rewrite,
}

impl Rule {
    fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match &self.rewrite {
            Rewrite::Template(template) => self.pattern.replace_all(text, *template),
            Rewrite::With(f) => self.pattern.replace_all(text, |caps: &Captures<'_>| f(caps)),
        }
    }
}

/// Rule table, applied top to bottom.
const RULE_TABLE: &[(&str, &str, Rewrite)] = &[
    // "Title\n=====" -> "# Title"
    (
        "underline-h1",
        r"(?m)^([^#\s][^\n]*)\n[ \t]*={3,}[ \t]*$",
        Rewrite::Template("# $1"),
    ),
    // "Title\n-----" -> "## Title"
    (
        "underline-h2",
        r"(?m)^([^#|\s][^\n]*)\n[ \t]*-{3,}[ \t]*$",
        Rewrite::Template("## $1"),
    ),
    // "  3. item" -> "1. item"
    (
        "ordered-list",
        r"(?m)^[ \t]*\d+\.[ \t]+",
        Rewrite::Template("1. "),
    ),
    // "* item", "+ item", "• item" -> "- item"
    (
        "bullet-list",
        r"(?m)^[ \t]*[-*+•][ \t]+",
        Rewrite::Template("- "),
    ),
    // "__strong__" -> "**strong**"
    (
        "strong-underscore",
        r"\b__(\w[\w ]*\w|\w)__\b",
        Rewrite::Template("**${1}**"),
    ),
    // "_em_" -> "*em*"
    (
        "emphasis-underscore",
        r"\b_(\w[\w ]*\w|\w)_\b",
        Rewrite::Template("*${1}*"),
    ),
    // bare URL -> [url](url)
    (
        "bare-url",
        r#"(^|[^\[\]()<"'=/\w])(https?://[^\s<>()\[\]"']+)"#,
        Rewrite::With(link_bare_url),
    ),
    // runs of blank lines -> one blank line
    (
        "blank-runs",
        r"\n[ \t]*\n(?:[ \t]*\n)+",
        Rewrite::Template("\n\n"),
    ),
];

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    RULE_TABLE
        .iter()
        .filter_map(|&(name, pattern, ref rewrite)| match Regex::new(pattern) {
            Ok(pattern) => Some(Rule {
                name,
                pattern,
                rewrite: *rewrite,
            }),
            Err(e) => {
                tracing::warn!("Skipping normalization rule {}: {}", name, e);
                None
            }
        })
        .collect()
});

/// Characters that end a sentence rather than a URL.
const URL_TRAILING: &[char] = &['.', ',', ';', ':', '!', '?', '*', '_'];

fn link_bare_url(caps: &Captures<'_>) -> String {
    let prefix = &caps[1];
    let raw = &caps[2];
    let url = raw.trim_end_matches(URL_TRAILING);
    let trailing = &raw[url.len()..];
    format!("{}[{}]({}){}", prefix, url, url, trailing)
}

/// Rewrite loosely structured text into markdown.
///
/// Total: never fails, empty or blank input yields an empty string.
pub fn normalize(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let text = text.replace("\r\n", "\n");
    let mut out = String::with_capacity(text.len() + 32);

    for segment in split_fences(&text) {
        match segment {
            Segment::Code(code) => out.push_str(code),
            Segment::Prose(prose) => out.push_str(&normalize_prose(prose)),
        }
    }

    out
}

fn normalize_prose(prose: &str) -> String {
    let mut text = prose.to_string();
    for rule in RULES.iter() {
        let rewritten = match rule.apply(&text) {
            Cow::Owned(rewritten) => Some(rewritten),
            Cow::Borrowed(_) => None,
        };
        if let Some(rewritten) = rewritten {
            tracing::trace!("Normalization rule {} applied", rule.name);
            text = rewritten;
        }
    }
    insert_table_delimiters(&text)
}

enum Segment<'a> {
    Prose(&'a str),
    Code(&'a str),
}

/// Split text into prose and fenced-code segments on line boundaries.
///
/// An unterminated fence runs to the end of the text.
fn split_fences(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut offset = 0;
    let mut fence: Option<&str> = None;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let marker = if trimmed.starts_with("```") {
            Some("```")
        } else if trimmed.starts_with("~~~") {
            Some("~~~")
        } else {
            None
        };

        match (fence, marker) {
            (None, Some(m)) => {
                if offset > start {
                    segments.push(Segment::Prose(&text[start..offset]));
                }
                start = offset;
                fence = Some(m);
            }
            (Some(open), Some(m)) if open == m => {
                let end = offset + line.len();
                segments.push(Segment::Code(&text[start..end]));
                start = end;
                fence = None;
            }
            _ => {}
        }

        offset += line.len();
    }

    if start < text.len() {
        let rest = &text[start..];
        segments.push(match fence {
            Some(_) => Segment::Code(rest),
            None => Segment::Prose(rest),
        });
    }

    segments
}

fn is_pipe_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 2 && trimmed.starts_with('|') && trimmed.ends_with('|')
}

fn is_delimiter_row(line: &str) -> bool {
    let trimmed = line.trim().trim_matches('|');
    !trimmed.is_empty()
        && trimmed.split('|').all(|cell| {
            let cell = cell.trim().trim_start_matches(':').trim_end_matches(':');
            cell.len() >= 3 && cell.chars().all(|c| c == '-')
        })
}

fn column_count(line: &str) -> usize {
    line.trim().trim_matches('|').split('|').count()
}

/// Give every block of pipe-delimited lines a header delimiter row.
///
/// Blocks that already have one are left alone. A blank line is added before
/// a block that directly follows a paragraph so the block parses as a table.
fn insert_table_delimiters(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len() + 2);
    let mut i = 0;

    while i < lines.len() {
        if !is_pipe_row(lines[i]) {
            out.push(lines[i].to_string());
            i += 1;
            continue;
        }

        let block_end = lines[i..]
            .iter()
            .position(|line| !is_pipe_row(line))
            .map_or(lines.len(), |n| i + n);
        let block = &lines[i..block_end];

        if out.last().is_some_and(|prev| !prev.trim().is_empty()) {
            out.push(String::new());
        }

        out.push(block[0].to_string());
        let has_delimiter = block.get(1).is_some_and(|line| is_delimiter_row(line));
        if !has_delimiter {
            out.push(format!("|{}", "---|".repeat(column_count(block[0]))));
        }
        out.extend(block[1..].iter().map(|line| line.to_string()));

        i = block_end;
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underline_headers() {
        let text = "Resumo\n======\nTexto\n\nDetalhes\n--------\nMais texto";
        let out = normalize(text);
        assert!(out.starts_with("# Resumo\nTexto"));
        assert!(out.contains("## Detalhes\nMais texto"));
    }

    #[test]
    fn test_horizontal_rule_after_blank_line_is_kept() {
        let out = normalize("Texto\n\n---\n\nFim");
        assert_eq!(out, "Texto\n\n---\n\nFim");
    }

    #[test]
    fn test_lists_are_canonicalized() {
        let out = normalize("  3. terceiro\n  4. quarto\n* um\n+ dois\n• três");
        assert_eq!(out, "1. terceiro\n1. quarto\n- um\n- dois\n- três");
    }

    #[test]
    fn test_emphasis_normalization() {
        assert_eq!(normalize("isso é __muito__ _importante_"), "isso é **muito** *importante*");
    }

    #[test]
    fn test_snake_case_is_not_emphasis() {
        assert_eq!(normalize("use portaria_id_antigo"), "use portaria_id_antigo");
    }

    #[test]
    fn test_bare_urls_become_links() {
        let out = normalize("Veja https://www.mpc.pa.gov.br/portarias.");
        assert_eq!(
            out,
            "Veja [https://www.mpc.pa.gov.br/portarias](https://www.mpc.pa.gov.br/portarias)."
        );
    }

    #[test]
    fn test_existing_links_untouched() {
        let text = "Veja [o site](https://example.com) e <https://example.org>";
        assert_eq!(normalize(text), text);
    }

    #[test]
    fn test_blank_runs_collapse() {
        assert_eq!(normalize("a\n\n\n\n b\n \n\t\nc"), "a\n\n b\n\nc");
    }

    #[test]
    fn test_pipe_rows_become_table() {
        let out = normalize("Tabela:\n| Ano | Total |\n| 2022 | 10 |");
        assert_eq!(out, "Tabela:\n\n| Ano | Total |\n|---|---|\n| 2022 | 10 |");
    }

    #[test]
    fn test_table_with_delimiter_untouched() {
        let text = "| Ano | Total |\n|:---|---:|\n| 2022 | 10 |";
        assert_eq!(normalize(text), text);
    }

    #[test]
    fn test_fenced_code_is_not_rewritten() {
        let text = "Exemplo:\n```\n* não é lista\n__init__\n```\n* lista";
        assert_eq!(normalize(text), "Exemplo:\n```\n* não é lista\n__init__\n```\n- lista");
    }

    #[test]
    fn test_unterminated_fence() {
        let text = "```\n* dentro";
        assert_eq!(normalize(text), text);
    }

    #[test]
    fn test_blank_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("  \n\t"), "");
    }

    #[test]
    fn test_normalize_is_stable_on_its_output() {
        let text = "Título\n===\n\n2. item\n* outro\nVeja https://example.com\n| a | b |";
        let once = normalize(text);
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_crlf_input() {
        assert_eq!(normalize("Título\r\n===\r\n* a"), "# Título\n- a");
    }
}
