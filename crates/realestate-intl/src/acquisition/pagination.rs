//! Search-result page discovery.
//!
//! Two entry states: an explicit page count emits URLs straight away, while
//! discovery fetches page 1 once and reads the highest page index from its
//! pagination control. Both end after emitting the URL set.

use super::http_client::PageFetcher;
use super::page::HtmlPage;
use anyhow::{Context, Result};
use scraper::Selector;
use url::Url;

/// Items of the pagination control that carry a page title.
pub const PAGINATION_ITEM_SELECTOR: &str = "ul.ant-pagination li[title]";
/// Titles of the step controls, which are not page indexes.
const STEP_TITLES: [&str; 2] = ["Previous Page", "Next Page"];

/// Search-results root for one country, `<origin>/international/<country>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSite {
    base: String,
}

impl ListingSite {
    pub fn new(origin: &Url, country_code: &str) -> Self {
        let origin = origin.as_str().trim_end_matches('/');
        Self {
            base: format!("{origin}/international/{country_code}"),
        }
    }

    /// URL of page 1.
    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Page 1 is the bare base; later pages append `/p<N>`.
    pub fn page_url(&self, page: u32) -> String {
        if page <= 1 {
            self.base.clone()
        } else {
            format!("{}/p{page}", self.base)
        }
    }

    /// URLs for pages `1..=last_page`, in order.
    pub fn page_urls(&self, last_page: u32) -> Vec<String> {
        (1..=last_page).map(|page| self.page_url(page)).collect()
    }
}

/// How the page count is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCount {
    /// Known up front; no fetch needed.
    Explicit(u32),
    /// Probe page 1 for the last page index.
    Discover,
}

impl From<Option<u32>> for PageCount {
    fn from(max_pages: Option<u32>) -> Self {
        max_pages.map_or(PageCount::Discover, PageCount::Explicit)
    }
}

/// Produces the full list of search-result page URLs for one site.
#[derive(Debug, Clone)]
pub struct PaginationDiscoverer {
    site: ListingSite,
    count: PageCount,
}

impl PaginationDiscoverer {
    pub fn new(site: ListingSite, count: PageCount) -> Self {
        Self { site, count }
    }

    pub fn site(&self) -> &ListingSite {
        &self.site
    }

    pub fn count(&self) -> PageCount {
        self.count
    }

    /// Emit every page URL. Only the discovery state touches the network.
    pub async fn discover<F>(&self, fetcher: &F) -> Result<Vec<String>>
    where
        F: PageFetcher + ?Sized,
    {
        let last_page = match self.count {
            PageCount::Explicit(pages) => pages,
            PageCount::Discover => {
                let resp = fetcher
                    .fetch(self.site.base_url())
                    .await
                    .context("failed to fetch first listing page for pagination discovery")?;
                let page = HtmlPage::parse(resp.final_url, &resp.body);
                let last = last_page(&page);
                tracing::info!("last page found: {last}");
                last
            }
        };
        Ok(self.site.page_urls(last_page))
    }
}

/// Highest page index shown in the pagination control, or 1 when there is none.
pub fn last_page(page: &HtmlPage) -> u32 {
    let sel = Selector::parse(PAGINATION_ITEM_SELECTOR).unwrap();
    page.document()
        .select(&sel)
        .filter_map(|item| item.value().attr("title"))
        .filter(|title| !STEP_TITLES.contains(title))
        .filter_map(|title| title.trim().parse::<u32>().ok())
        .max()
        .unwrap_or(1)
        .max(1)
}
