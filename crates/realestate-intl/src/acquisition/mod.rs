//! HTTP acquisition and HTML-side extraction.
//!
//! Everything here deals with raw pages: fetching them, finding the inline
//! JSON blocks and fallback text on detail pages, enumerating listing links on
//! search-result pages, and deriving the set of search-result pages to visit.

pub mod http_client;
pub mod links;
pub mod page;
pub mod pagination;

pub use http_client::{FetchError, HttpClient, HttpResponse, PageFetcher};
pub use page::{HtmlPage, PageText};
