//! Markdown rendering and HTML sanitization.
//!
//! Text is parsed with pulldown-cmark with the GFM extensions enabled. Bare
//! URLs are turned into links, single newlines become `<br>` and headings get
//! slug anchors. The resulting HTML always goes through an ammonia allow-list
//! before it leaves this module.

use ammonia::Builder;
use once_cell::sync::Lazy;
use pulldown_cmark::{html, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream};
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Tags that survive sanitization.
const ALLOWED_TAGS: &[&str] = &[
    "a", "b", "blockquote", "br", "code", "del", "em", "h1", "h2", "h3", "h4", "h5", "h6", "hr",
    "i", "input", "li", "ol", "p", "pre", "s", "strong", "sub", "sup", "table", "tbody", "td", "th",
    "thead", "tr", "ul",
];

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Forced on every link.
pub const LINK_REL: &str = "noopener noreferrer";
pub const LINK_TARGET: &str = "_blank";

static SANITIZER: Lazy<Builder<'static>> = Lazy::new(|| {
    let mut tag_attributes: HashMap<&'static str, HashSet<&'static str>> = HashMap::new();
    tag_attributes.insert("a", ["href", "title"].into_iter().collect());
    tag_attributes.insert("ol", ["start"].into_iter().collect());
    // task list checkboxes only
    tag_attributes.insert("input", ["type", "checked", "disabled"].into_iter().collect());
    for heading in HEADINGS {
        tag_attributes.insert(heading, ["id"].into_iter().collect());
    }

    let mut builder = Builder::default();
    builder
        .tags(ALLOWED_TAGS.iter().copied().collect())
        .generic_attributes(HashSet::new())
        .tag_attributes(tag_attributes)
        .url_schemes(["http", "https", "mailto"].into_iter().collect())
        .link_rel(Some(LINK_REL))
        .set_tag_attribute_value("a", "target", LINK_TARGET)
        .strip_comments(true);
    builder
});

static BARE_URL: Lazy<Option<Regex>> = Lazy::new(|| match Regex::new(r#"https?://[^\s<>()\[\]"']+"#) {
    Ok(re) => Some(re),
    Err(e) => {
        tracing::warn!("Autolinking disabled: {}", e);
        None
    }
});

/// Characters that end a sentence rather than a URL.
const URL_TRAILING: &[char] = &['.', ',', ';', ':', '!', '?'];

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Upper bound on render passes before the output is accepted as is.
const MAX_RENDER_PASSES: usize = 4;

/// Render markdown to sanitized HTML.
///
/// Pure and total: blank input gives an empty string. Feeding the output back
/// in yields the same HTML.
///
/// Stripping a disallowed wrapper (`<div>`, `<details>`) leaves its inner
/// text bare, and bare text reads as markdown again. The output is therefore
/// rendered until it stops changing, which makes it a fixed point.
pub fn render(text: &str) -> String {
    let mut current = render_pass(text);
    for _ in 1..MAX_RENDER_PASSES {
        let next = render_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
    tracing::debug!("Rendered HTML still changing after {} passes", MAX_RENDER_PASSES);
    current
}

fn render_pass(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }
    escape_blank_lines(&sanitize(&markdown_to_html(text)))
}

/// Replace the newline that ends each interior blank line with `&#10;`.
///
/// A blank line ends an HTML block when the output is read as markdown again,
/// which would split a `<pre>` apart. The entity decodes to the same newline.
/// Leading and trailing blank lines carry no content and are left alone.
fn escape_blank_lines(html: &str) -> String {
    let lines: Vec<&str> = html.split_inclusive('\n').collect();
    let is_blank = |line: &&str| line.trim().is_empty();
    let first = lines.iter().position(|line| !is_blank(line));
    let last = lines.iter().rposition(|line| !is_blank(line));
    let (Some(first), Some(last)) = (first, last) else {
        return html.to_string();
    };

    let mut out = String::with_capacity(html.len());
    for (i, line) in lines.iter().enumerate() {
        match line.strip_suffix('\n') {
            Some(content) if i > first && i < last && content.trim().is_empty() => {
                out.push_str(content);
                out.push_str("&#10;");
            }
            _ => out.push_str(line),
        }
    }
    out
}

/// Run HTML through the allow-list.
pub fn sanitize(html: &str) -> String {
    SANITIZER.clean(html).to_string()
}

/// Unsanitized HTML for `text`. Never expose this directly.
fn markdown_to_html(text: &str) -> String {
    let parser = TextMergeStream::new(Parser::new_ext(text, parser_options()));

    let mut events: Vec<Event<'_>> = Vec::new();
    let mut link_depth = 0usize;
    let mut in_code_block = false;

    for event in parser {
        match &event {
            Event::Start(Tag::Link { .. } | Tag::Image { .. }) => link_depth += 1,
            Event::End(TagEnd::Link | TagEnd::Image) => link_depth = link_depth.saturating_sub(1),
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            _ => {}
        }

        match event {
            Event::SoftBreak => events.push(Event::HardBreak),
            Event::Text(text) if link_depth == 0 && !in_code_block => autolink(text, &mut events),
            other => events.push(other),
        }
    }

    assign_heading_ids(&mut events);

    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

/// Split a text event around bare URLs, wrapping each URL in a link.
fn autolink<'a>(text: CowStr<'a>, events: &mut Vec<Event<'a>>) {
    let spans: Vec<(usize, usize)> = match BARE_URL.as_ref() {
        Some(re) => re
            .find_iter(&text)
            .map(|m| {
                let url = m.as_str().trim_end_matches(URL_TRAILING);
                (m.start(), m.start() + url.len())
            })
            .filter(|(start, end)| end > start)
            .collect(),
        None => Vec::new(),
    };

    if spans.is_empty() {
        events.push(Event::Text(text));
        return;
    }

    let mut last = 0;
    for (start, end) in spans {
        if start > last {
            events.push(Event::Text(CowStr::from(text[last..start].to_string())));
        }
        let url = text[start..end].to_string();
        events.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(url.clone()),
            title: CowStr::from(""),
            id: CowStr::from(""),
        }));
        events.push(Event::Text(CowStr::from(url)));
        events.push(Event::End(TagEnd::Link));
        last = end;
    }
    if last < text.len() {
        events.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}

/// Give each heading without an explicit id a unique slug id.
fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut i = 0;

    while i < events.len() {
        if matches!(&events[i], Event::Start(Tag::Heading { id: None, .. })) {
            let mut text = String::new();
            let mut j = i + 1;
            while j < events.len() {
                match &events[j] {
                    Event::End(TagEnd::Heading(_)) => break,
                    Event::Text(t) | Event::Code(t) => text.push_str(t),
                    _ => {}
                }
                j += 1;
            }

            let slug = slugify(&text);
            if !slug.is_empty() {
                let slug = unique_slug(slug, &mut seen);
                if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
                    *id = Some(CowStr::from(slug));
                }
            }
            i = j;
        }
        i += 1;
    }
}

/// Lowercase, keep letters, digits and `_`, join everything else with `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

fn unique_slug(slug: String, seen: &mut HashMap<String, usize>) -> String {
    let count = seen.entry(slug.clone()).or_insert(0);
    *count += 1;
    if *count == 1 {
        slug
    } else {
        format!("{}-{}", slug, *count - 1)
    }
}
