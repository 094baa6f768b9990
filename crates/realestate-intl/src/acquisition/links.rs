//! Detail-page links on a search-results page.

use super::page::HtmlPage;
use scraper::Selector;
use url::Url;

/// Marker element that every listing card carries.
pub const LISTING_CARD_SELECTOR: &str = r#"[data-testid="standard-listing-card"]"#;

/// Absolute URLs of every anchor wrapping a listing card, in document order.
///
/// Duplicates are kept. Relative hrefs resolve against the page URL; an href
/// that cannot be resolved is skipped.
pub fn listing_links(page: &HtmlPage) -> Vec<String> {
    let anchor_sel = Selector::parse("a[href]").unwrap();
    let card_sel = Selector::parse(LISTING_CARD_SELECTOR).unwrap();
    let base = Url::parse(page.url()).ok();

    page.document()
        .select(&anchor_sel)
        .filter(|anchor| anchor.select(&card_sel).next().is_some())
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| resolve_href(base.as_ref(), href))
        .collect()
}

fn resolve_href(base: Option<&Url>, href: &str) -> Option<String> {
    let href = href.trim();
    let resolved = match base {
        Some(base) => base.join(href),
        None => Url::parse(href),
    };
    resolved.ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = r#"
    <html><body>
    <a href="/international/id/bali/villa-101"><div data-testid="standard-listing-card">Villa</div></a>
    <a href="/international/id/about">About us</a>
    <a href="https://www.realestate.com.au/international/id/jakarta/apartment-7">
        <section><article data-testid="standard-listing-card">Apartment</article></section>
    </a>
    <a data-testid="standard-listing-card" href="/self-marked">Marker on anchor</a>
    <a href="/international/id/bali/villa-101"><span data-testid="standard-listing-card">Again</span></a>
    <a><div data-testid="standard-listing-card">No href</div></a>
    </body></html>
    "#;

    #[test]
    fn test_listing_links_resolved_in_order() {
        let page = HtmlPage::parse("https://www.realestate.com.au/international/id/p2", RESULTS_PAGE);
        let links = listing_links(&page);
        assert_eq!(
            links,
            [
                "https://www.realestate.com.au/international/id/bali/villa-101",
                "https://www.realestate.com.au/international/id/jakarta/apartment-7",
                "https://www.realestate.com.au/international/id/bali/villa-101",
            ]
        );
    }

    #[test]
    fn test_no_cards_no_links() {
        let page = HtmlPage::parse(
            "https://www.realestate.com.au/international/id",
            r#"<a href="/x">x</a>"#,
        );
        assert!(listing_links(&page).is_empty());
    }

    #[test]
    fn test_unparsable_base_keeps_absolute_links() {
        let html = r#"
        <a href="/relative"><i data-testid="standard-listing-card"></i></a>
        <a href="https://example.com/abs"><i data-testid="standard-listing-card"></i></a>
        "#;
        let page = HtmlPage::parse("not a url", html);
        assert_eq!(listing_links(&page), ["https://example.com/abs"]);
    }
}
