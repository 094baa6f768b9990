//! Parsed HTML pages and the selector capabilities extraction relies on.

use scraper::{ElementRef, Html, Selector};

/// JSON-typed inline script blocks.
pub const JSON_SCRIPT_SELECTOR: &str = r#"script[type="application/json"]"#;
/// The framework hydration payload.
pub const NEXT_DATA_SELECTOR: &str = "script#__NEXT_DATA__";

/// Text lookups by CSS selector.
///
/// Listing extraction only needs these two shapes of text, so this is the
/// whole surface it sees of the rendered page. An invalid selector matches
/// nothing.
pub trait PageText {
    /// First non-blank text node sitting directly under any element matching
    /// `css`, trimmed.
    fn own_text(&self, css: &str) -> Option<String>;

    /// Every text node inside the descendant elements of each element
    /// matching `css`, in document order. Text sitting directly under the
    /// matched element itself is not included.
    fn descendant_texts(&self, css: &str) -> Vec<String>;
}

/// One fetched page, parsed.
pub struct HtmlPage {
    url: String,
    document: Html,
}

impl HtmlPage {
    pub fn parse(url: impl Into<String>, html: &str) -> Self {
        Self {
            url: url.into(),
            document: Html::parse_document(html),
        }
    }

    /// URL the page was served from; relative links resolve against it.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    /// Raw text of every inline JSON-bearing block, JSON-typed scripts first
    /// in document order, then the hydration payload.
    pub fn inline_json_blocks(&self) -> Vec<String> {
        let mut blocks = Vec::new();
        for css in [JSON_SCRIPT_SELECTOR, NEXT_DATA_SELECTOR] {
            let Ok(sel) = Selector::parse(css) else {
                continue;
            };
            if css == NEXT_DATA_SELECTOR {
                if let Some(element) = self.document.select(&sel).next() {
                    blocks.push(element.text().collect::<String>());
                }
            } else {
                blocks.extend(
                    self.document
                        .select(&sel)
                        .map(|element| element.text().collect::<String>()),
                );
            }
        }
        blocks
    }
}

impl PageText for HtmlPage {
    fn own_text(&self, css: &str) -> Option<String> {
        let sel = Selector::parse(css).ok()?;
        self.document.select(&sel).find_map(|element| {
            element.children().find_map(|child| {
                let text = child.value().as_text()?.trim();
                (!text.is_empty()).then(|| text.to_string())
            })
        })
    }

    fn descendant_texts(&self, css: &str) -> Vec<String> {
        let Ok(sel) = Selector::parse(css) else {
            return Vec::new();
        };
        let mut texts = Vec::new();
        for root in self.document.select(&sel) {
            for child in root.children().filter_map(ElementRef::wrap) {
                texts.extend(child.text().map(str::to_string));
            }
        }
        texts
    }
}
