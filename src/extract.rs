//! Article text extraction.
//!
//! Uses scraper for HTML parsing. Boilerplate elements are detached from the
//! tree before the main content region is chosen, so nothing inside them can
//! contribute text.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Minimum number of characters an extraction must yield
pub const MIN_CONTENT_CHARS: usize = 200;

/// Elements removed before extraction, wherever they appear
const BOILERPLATE_SELECTOR: &str = "script, style, nav, footer, header, aside";

/// Main content candidates, in priority order
const CONTENT_ROOTS: [&str; 3] = ["article", "main", "body"];

/// Elements whose text is collected from the content root
const TEXT_SELECTOR: &str = "h1, h2, h3, p, li";

lazy_static! {
    static ref CITATION_MARKER: Regex = Regex::new(r"\[\d+\]").unwrap();
    static ref BLANK_LINES: Regex = Regex::new(r"\n\s*\n").unwrap();
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Could not extract main content.")]
    NoContentRegion,
    #[error("Extracted content too small ({length} characters). Page may not contain article text.")]
    TooShort { length: usize },
}

/// Cleaned article text, guaranteed to be at least [`MIN_CONTENT_CHARS`] long
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the substantive text of an HTML page
pub fn extract_text(html: &str) -> Result<ExtractedText, ExtractError> {
    let mut document = Html::parse_document(html);
    strip_boilerplate(&mut document);

    let root = find_content_root(&document).ok_or(ExtractError::NoContentRegion)?;
    let joined = collect_blocks(root);
    let cleaned = normalize(&joined);

    let length = cleaned.chars().count();
    if length < MIN_CONTENT_CHARS {
        return Err(ExtractError::TooShort { length });
    }

    Ok(ExtractedText(cleaned))
}

/// Detach every boilerplate element from the tree
fn strip_boilerplate(document: &mut Html) {
    let selector = Selector::parse(BOILERPLATE_SELECTOR).unwrap();
    let ids: Vec<_> = document.select(&selector).map(|element| element.id()).collect();

    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// First `article`, else first `main`, else `body`
fn find_content_root(document: &Html) -> Option<ElementRef<'_>> {
    CONTENT_ROOTS.iter().find_map(|name| {
        let selector = Selector::parse(name).ok()?;
        document.select(&selector).next()
    })
}

/// Join the trimmed text of headings, paragraphs and list items in document order
fn collect_blocks(root: ElementRef<'_>) -> String {
    let selector = Selector::parse(TEXT_SELECTOR).unwrap();
    let mut content = String::new();

    for element in root.select(&selector) {
        let text: String = element.text().collect();
        let text = text.trim();
        if !text.is_empty() {
            content.push_str(text);
            content.push_str("\n\n");
        }
    }

    content
}

/// Drop `[n]` citation markers and squeeze blank-line runs to one paragraph break
fn normalize(text: &str) -> String {
    let without_markers = CITATION_MARKER.replace_all(text, "");
    let squeezed = BLANK_LINES.replace_all(&without_markers, "\n\n");
    squeezed.trim().to_string()
}
