//! Readability-based main content extraction.

use std::io::Cursor;
use std::panic::{AssertUnwindSafe, catch_unwind};

use scraper::{ElementRef, Html, Node};
use tracing::{debug, warn};
use url::Url;

/// Base used to resolve relative links when the page URL does not parse.
const FALLBACK_BASE_URL: &str = "http://localhost/";

/// Elements whose boundaries start a new line in the rendered text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt",
    "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th",
    "title", "tr", "ul",
];

/// Elements whose text is never part of the readable content.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Runs the readability heuristic over `html` and returns its plain text,
/// one block (paragraph, heading, list item...) per line.
///
/// Returns `None` when nothing readable is found. A panic inside the
/// heuristic is treated the same way, so hostile markup can only cost the
/// `main_content` field.
#[must_use]
pub fn main_content(html: &str, url: &str) -> Option<String> {
    let base = Url::parse(url)
        .or_else(|_| Url::parse(FALLBACK_BASE_URL))
        .ok()?;

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let mut cursor = Cursor::new(html.as_bytes());
        readability::extractor::extract(&mut cursor, &base)
    }));

    match outcome {
        Ok(Ok(product)) => {
            let text = render_blocks(&product.content);
            (!text.is_empty()).then_some(text)
        }
        Ok(Err(e)) => {
            debug!(error = %e, "readability extraction failed");
            None
        }
        Err(_) => {
            warn!("readability extraction panicked");
            None
        }
    }
}

/// Converts cleaned article markup to text with a newline between blocks and
/// whitespace collapsed within each line.
fn render_blocks(content: &str) -> String {
    let fragment = Html::parse_fragment(content);
    let mut raw = String::new();
    push_text(fragment.root_element(), &mut raw);

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            // Source line breaks are plain whitespace; only block edges end a line.
            Node::Text(text) => out.extend(
                text.chars()
                    .map(|c| if matches!(c, '\n' | '\r') { ' ' } else { c }),
            ),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = child.value().name();
                if SKIPPED_ELEMENTS.contains(&name) {
                    continue;
                }
                let block = BLOCK_ELEMENTS.contains(&name);
                if block {
                    out.push('\n');
                }
                push_text(child, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"
        <html>
        <head><title>Article</title></head>
        <body>
            <nav><a href="/">Home</a> <a href="/about">About</a></nav>
            <article>
                <p>The quick brown fox jumps over the lazy dog. This sentence is here so the
                readability scorer has a paragraph with commas, length, and substance to rank.</p>
                <p>A second paragraph keeps going with more detail about the fox, the dog, and
                the many reasons a reader might care about either of them at all.</p>
            </article>
        </body>
        </html>
    "#;

    #[test]
    fn test_main_content_finds_article_text() {
        let text = main_content(ARTICLE, "https://example.com/post").unwrap_or_default();
        assert!(text.contains("quick brown fox"), "got: {text}");
    }

    #[test]
    fn test_main_content_empty_document_is_none() {
        assert_eq!(main_content("", "https://example.com/"), None);
    }

    #[test]
    fn test_main_content_keeps_minified_paragraphs_apart() {
        let html = "<html><body><article><p>The first paragraph talks about foxes, \
            dogs, and the long afternoons they spend together in the field for a long \
            while.</p><p>The quick brown fox then jumps over the lazy dog, again and \
            again, until the sun finally sets behind the distant hills.</p></article>\
            </body></html>";
        let text = main_content(html, "https://example.com/post").unwrap_or_default();
        assert!(!text.contains("while.The"), "blocks fused: {text}");
        assert!(text.contains("while.\nThe quick brown fox"), "got: {text}");
    }

    #[test]
    fn test_render_blocks_separates_block_elements() {
        assert_eq!(render_blocks("<p>A.</p><p>B.</p>"), "A.\nB.");
        assert_eq!(
            render_blocks("<div><h2>Title</h2><ul><li>one</li><li>two</li></ul></div>"),
            "Title\none\ntwo"
        );
    }

    #[test]
    fn test_render_blocks_keeps_inline_text_on_one_line() {
        assert_eq!(
            render_blocks("<p>Read   the <a href=\"/x\">full\n story</a> <em>now</em>.</p>"),
            "Read the full story now."
        );
    }

    #[test]
    fn test_render_blocks_skips_scripts_and_styles() {
        assert_eq!(
            render_blocks("<p>kept</p><script>var x = 1;</script><style>p{}</style>"),
            "kept"
        );
    }

    #[test]
    fn test_main_content_tolerates_unparseable_url() {
        let text = main_content(ARTICLE, "::not a url::").unwrap_or_default();
        assert!(text.contains("quick brown fox"), "got: {text}");
    }
}
