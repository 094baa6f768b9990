//! Listing records and the per-page extraction pipeline.

pub mod builder;
pub mod record;

pub use builder::ListingRecordBuilder;
pub use record::{BuildingFeature, ListingRecord};

use crate::acquisition::page::HtmlPage;
use crate::graph::FragmentGraphBuilder;

/// Extract the listing on one detail page.
///
/// Merges every inline JSON block into a fresh graph, then resolves the
/// listing from it. Returns `None` when the page carries no listing fragment.
pub fn extract_listing(url: &str, html: &str) -> Option<ListingRecord> {
    let page = HtmlPage::parse(url, html);
    let graph = FragmentGraphBuilder::from_blocks(page.inline_json_blocks());
    let record = ListingRecordBuilder::new(&graph).build(url, &page);
    if record.is_none() {
        tracing::debug!("no listing fragment on {url} ({} fragments)", graph.len());
    }
    record
}
