//! Structured content extraction from raw HTML.
//!
//! [`extract`] is a pure function: the same markup always yields the same
//! [`ExtractionResult`] (modulo the readability heuristic). It never fails.
//! Anything it cannot find is reported with a sentinel string so every field
//! of the result is always present.
//!
//! # Example
//!
//! ```
//! use page_scraper::extract::extract;
//!
//! let html = r#"<html><head><title>T</title></head>
//!     <body><h1>H1</h1><a href="/x">link</a></body></html>"#;
//! let result = extract(html, "https://example.com/");
//! assert_eq!(result.title, "T");
//! assert_eq!(result.headings, vec!["H1".to_string()]);
//! assert_eq!(result.internal_link_count, 2);
//! ```

mod content;

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub use content::main_content;

/// Sentinel used when the document has no (non-empty) `<title>`.
pub const NO_TITLE: &str = "No title found";

/// Sentinel used when there is no `<meta name="description">` with content.
pub const NO_META_DESCRIPTION: &str = "No meta description found";

/// Sentinel used when readability extraction yields nothing.
pub const NO_MAIN_CONTENT: &str = "No main content extracted";

/// One anchor from the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Text content of the anchor.
    pub text: String,
    /// The `href` attribute, verbatim.
    pub href: String,
}

/// Everything extracted from a single page.
///
/// Serializes with the wire names consumers already depend on:
/// `headings` as `h1_tags` and `internal_link_count` as `pages_count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// The requested URL, echoed verbatim.
    pub url: String,
    /// Page title or [`NO_TITLE`].
    pub title: String,
    /// Meta description or [`NO_META_DESCRIPTION`].
    pub meta_description: String,
    /// Text of every `<h1>`, in document order.
    #[serde(rename = "h1_tags")]
    pub headings: Vec<String>,
    /// Every anchor with a non-empty `href`, in document order.
    pub links: Vec<Link>,
    /// Readable main text or [`NO_MAIN_CONTENT`].
    pub main_content: String,
    /// Distinct relative links plus one; see [`count_internal_pages`].
    #[serde(rename = "pages_count")]
    pub internal_link_count: usize,
}

/// Extracts the structured content of `html`, fetched from `url`.
#[must_use]
#[instrument(skip(html), fields(bytes = html.len()))]
pub fn extract(html: &str, url: &str) -> ExtractionResult {
    let document = Html::parse_document(html);
    let links = extract_links(&document);

    let result = ExtractionResult {
        url: url.to_string(),
        title: extract_title(&document).unwrap_or_else(|| NO_TITLE.to_string()),
        meta_description: extract_meta_description(&document)
            .unwrap_or_else(|| NO_META_DESCRIPTION.to_string()),
        headings: select_all(&document, "h1").map(|h1| element_text(&h1)).collect(),
        internal_link_count: count_internal_pages(links.iter().map(|link| link.href.as_str())),
        links,
        main_content: main_content(html, url).unwrap_or_else(|| NO_MAIN_CONTENT.to_string()),
    };

    debug!(
        headings = result.headings.len(),
        links = result.links.len(),
        pages_count = result.internal_link_count,
        "extracted page"
    );
    result
}

/// Counts the pages a document links to, by a deliberately rough rule.
///
/// An href counts when it does not start with `http` or `www`, is not exactly
/// `#`, and is not blank. Distinct hrefs are counted once; the page itself
/// adds one. A document without qualifying links yields `1`.
///
/// ```
/// use page_scraper::extract::count_internal_pages;
///
/// assert_eq!(count_internal_pages(["/a", "/a", "http://x.com", "#"]), 2);
/// assert_eq!(count_internal_pages(Vec::<&str>::new()), 1);
/// ```
#[must_use]
pub fn count_internal_pages<'a>(hrefs: impl IntoIterator<Item = &'a str>) -> usize {
    let internal: HashSet<&str> = hrefs
        .into_iter()
        .filter(|href| !href.is_empty())
        .filter(|href| !href.starts_with("http") && !href.starts_with("www") && *href != "#")
        .filter(|href| !href.trim().is_empty())
        .collect();

    internal.len() + 1
}

fn extract_title(document: &Html) -> Option<String> {
    select_all(document, "title")
        .next()
        .map(|title| element_text(&title))
        .filter(|text| !text.is_empty())
}

fn extract_meta_description(document: &Html) -> Option<String> {
    select_all(document, r#"meta[name="description"]"#)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(str::to_string)
}

fn extract_links(document: &Html) -> Vec<Link> {
    select_all(document, "a[href]")
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            if href.is_empty() {
                return None;
            }
            Some(Link {
                text: element_text(&anchor),
                href: href.to_string(),
            })
        })
        .collect()
}

/// Concatenated text of all descendants, without separators.
fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect()
}

fn select_all<'a>(document: &'a Html, css: &str) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    let selector = Selector::parse(css).ok();
    selector
        .into_iter()
        .flat_map(move |selector| document.select(&selector).collect::<Vec<_>>())
}
