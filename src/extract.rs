use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};

use crate::config::ExtractConfig;

/// Regions that never count as page content.
const STRIPPED_TAGS: [&str; 6] = ["script", "style", "nav", "header", "footer", "aside"];

/// Main-content candidates, most specific first. The first selector with a
/// surviving match wins, even when that match has no text.
const CONTENT_SELECTORS: [&str; 8] = [
    "main",
    "article",
    ".content",
    ".main-content",
    ".post-content",
    ".entry-content",
    "#content",
    "#main",
];

static CONTENT_SELECTOR_LIST: LazyLock<Vec<(&'static str, Selector)>> = LazyLock::new(|| {
    CONTENT_SELECTORS
        .iter()
        .map(|raw| (*raw, static_selector(raw)))
        .collect()
});
static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| static_selector("title"));
static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| static_selector("body"));

pub(crate) fn static_selector(raw: &str) -> Selector {
    Selector::parse(raw).unwrap_or_else(|err| panic!("invalid static selector {raw:?}: {err}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub title: String,
    pub content: String,
    /// Character count of `content`, marker included.
    pub length: usize,
}

pub fn extract_text_content(html: &str, config: &ExtractConfig) -> ExtractedText {
    let document = Html::parse_document(html);

    let title = first_surviving(&document, &TITLE_SELECTOR)
        .map(|el| el.text().collect::<String>().trim().to_owned())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| config.untitled.clone());

    let mut raw = String::new();
    for (name, selector) in CONTENT_SELECTOR_LIST.iter() {
        if let Some(el) = first_surviving(&document, selector) {
            tracing::debug!(selector = name, "main content candidate matched");
            raw = element_text(el);
            break;
        }
    }
    if raw.is_empty() {
        if let Some(body) = document.select(&BODY_SELECTOR).next() {
            raw = element_text(body);
        }
    }

    let content = truncate_chars(
        &collapse_whitespace(&raw),
        config.max_chars,
        &config.truncation_marker,
    );
    let length = content.chars().count();
    ExtractedText {
        title,
        content,
        length,
    }
}

fn first_surviving<'a>(document: &'a Html, selector: &Selector) -> Option<ElementRef<'a>> {
    document.select(selector).find(|el| !is_stripped(*el))
}

fn is_stripped_tag(name: &str) -> bool {
    STRIPPED_TAGS.contains(&name)
}

fn is_stripped(el: ElementRef<'_>) -> bool {
    is_stripped_tag(el.value().name())
        || el
            .ancestors()
            .any(|node| node.value().as_element().is_some_and(|e| is_stripped_tag(e.name())))
}

/// Text nodes under `el`, each trimmed, blanks dropped, joined by one space.
fn element_text(el: ElementRef<'_>) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut stack: Vec<_> = el.children().rev().collect();
    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed.to_owned());
                }
            }
            Node::Element(child) if is_stripped_tag(child.name()) => {}
            Node::Element(child)
                if child.name() == "noscript" && node.children().all(|c| c.value().is_text()) =>
            {
                let raw: String = node
                    .children()
                    .filter_map(|c| c.value().as_text().map(|t| &**t))
                    .collect();
                let text = noscript_text(&raw);
                if !text.is_empty() {
                    parts.push(text);
                }
            }
            Node::Element(_) => stack.extend(node.children().rev()),
            _ => {}
        }
    }
    parts.join(" ")
}

/// The parser runs with scripting enabled, so `<noscript>` content arrives as
/// one raw text node. Parse it again to keep only its text.
fn noscript_text(raw: &str) -> String {
    let fragment = Html::parse_fragment(raw);
    element_text(fragment.root_element())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, max_chars: usize, marker: &str) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str(marker);
    out
}
