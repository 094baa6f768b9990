//! The two-stage crawl: result pages yield detail links, detail pages yield
//! records.
//!
//! Each stage has its own `buffer_unordered` bound, and the stages run
//! interleaved, so detail fetches start as soon as the first result page is
//! enumerated. The result-page stage is only polled when the detail stage has
//! a free slot, so total in-flight fetches stay close to the configured bound
//! rather than doubling it.

use crate::acquisition::http_client::PageFetcher;
use crate::acquisition::links::listing_links;
use crate::acquisition::page::HtmlPage;
use crate::acquisition::pagination::PaginationDiscoverer;
use crate::listing::{extract_listing, ListingRecord};
use crate::sink::{RecordSink, SinkOutcome};
use anyhow::Result;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::fmt;

/// Counts reported at the end of a crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlSummary {
    pub listing_pages: usize,
    pub listing_pages_failed: usize,
    pub detail_pages: usize,
    pub detail_pages_failed: usize,
    pub pages_without_listing: usize,
    pub records_written: usize,
    pub records_ignored: usize,
    pub sink_failures: usize,
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} listing pages ({} failed), {} detail pages ({} failed, {} without listing), \
             {} records written ({} ignored, {} sink failures)",
            self.listing_pages,
            self.listing_pages_failed,
            self.detail_pages,
            self.detail_pages_failed,
            self.pages_without_listing,
            self.records_written,
            self.records_ignored,
            self.sink_failures,
        )
    }
}

/// Work flowing from the first stage into the second.
enum Work {
    ListingPageDone,
    ListingPageFailed,
    Detail(String),
}

enum Outcome {
    ListingPageDone,
    ListingPageFailed,
    Record(ListingRecord),
    NoListing,
    DetailFailed,
}

pub struct Crawler<F> {
    fetcher: F,
    concurrency: usize,
}

impl<F: PageFetcher> Crawler<F> {
    pub fn new(fetcher: F, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Crawl every result page the discoverer emits and hand each record to
    /// `sink`. Only a failed discovery probe aborts the crawl; every other
    /// failure is logged and counted.
    pub async fn run<S: RecordSink>(
        &self,
        discoverer: &PaginationDiscoverer,
        sink: &mut S,
    ) -> Result<CrawlSummary> {
        let page_urls = discoverer.discover(&self.fetcher).await?;
        tracing::info!("crawling {} result pages", page_urls.len());

        let mut outcomes = stream::iter(page_urls)
            .map(|url| self.enumerate(url))
            .buffer_unordered(self.concurrency)
            .flat_map(stream::iter)
            .map(|work| self.process(work))
            .buffer_unordered(self.concurrency);

        let mut summary = CrawlSummary::default();
        while let Some(outcome) = outcomes.next().await {
            match outcome {
                Outcome::ListingPageDone => summary.listing_pages += 1,
                Outcome::ListingPageFailed => {
                    summary.listing_pages += 1;
                    summary.listing_pages_failed += 1;
                }
                Outcome::DetailFailed => {
                    summary.detail_pages += 1;
                    summary.detail_pages_failed += 1;
                }
                Outcome::NoListing => {
                    summary.detail_pages += 1;
                    summary.pages_without_listing += 1;
                }
                Outcome::Record(record) => {
                    summary.detail_pages += 1;
                    let listing_id = record.listing_id.clone();
                    match sink.accept(record) {
                        Ok(SinkOutcome::Written) => summary.records_written += 1,
                        Ok(SinkOutcome::Ignored) => summary.records_ignored += 1,
                        Err(e) => {
                            tracing::warn!("failed to store listing {listing_id}: {e}");
                            summary.sink_failures += 1;
                        }
                    }
                }
            }
        }

        tracing::info!("crawl finished: {summary}");
        Ok(summary)
    }

    async fn enumerate(&self, url: String) -> Vec<Work> {
        let resp = match self.fetcher.fetch(&url).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!("skipping result page: {e}");
                return vec![Work::ListingPageFailed];
            }
        };

        let links = listing_links(&HtmlPage::parse(resp.final_url, &resp.body));
        tracing::debug!("{} listing links on {url}", links.len());

        let mut work = Vec::with_capacity(links.len() + 1);
        work.push(Work::ListingPageDone);
        work.extend(links.into_iter().map(Work::Detail));
        work
    }

    async fn process(&self, work: Work) -> Outcome {
        let url = match work {
            Work::ListingPageDone => return Outcome::ListingPageDone,
            Work::ListingPageFailed => return Outcome::ListingPageFailed,
            Work::Detail(url) => url,
        };

        match self.fetcher.fetch(&url).await {
            Ok(resp) => match extract_listing(&resp.final_url, &resp.body) {
                Some(record) => Outcome::Record(record),
                None => Outcome::NoListing,
            },
            Err(e) => {
                tracing::warn!("skipping detail page: {e}");
                Outcome::DetailFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::http_client::{FetchError, HttpResponse};
    use crate::acquisition::pagination::{ListingSite, PageCount};
    use crate::sink::{JsonLinesSink, SinkError};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    const BASE: &str = "https://site.test/international/id";

    /// Serves fixed bodies by URL; anything else is a 404.
    struct MapFetcher {
        pages: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl MapFetcher {
        fn new(pages: &[(&str, String)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, body)| (url.to_string(), body.clone()))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for MapFetcher {
        async fn fetch(&self, url: &str) -> Result<HttpResponse, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.pages.get(url) {
                Some(body) => Ok(HttpResponse {
                    url: url.to_string(),
                    final_url: url.to_string(),
                    status: 200,
                    body: body.clone(),
                }),
                None => Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    struct FailingSink;

    impl RecordSink for FailingSink {
        fn accept(&mut self, record: ListingRecord) -> Result<SinkOutcome, SinkError> {
            Err(SinkError::Write {
                listing_id: record.listing_id,
                source: std::io::Error::other("disk full"),
            })
        }
    }

    fn results_page(hrefs: &[&str]) -> String {
        let cards: String = hrefs
            .iter()
            .map(|h| format!(r#"<a href="{h}"><div data-testid="standard-listing-card">x</div></a>"#))
            .collect();
        format!("<html><body>{cards}</body></html>")
    }

    fn detail_page(id: &str) -> String {
        format!(
            r#"<html><head><script type="application/json">
            {{"apolloState": {{"ListingDetail:{id}": {{"id": "{id}", "price": "IDR {id}"}}}}}}
            </script></head><body></body></html>"#
        )
    }

    fn discoverer(count: PageCount) -> PaginationDiscoverer {
        let site = ListingSite::new(&Url::parse("https://site.test").unwrap(), "id");
        PaginationDiscoverer::new(site, count)
    }

    fn fixture() -> MapFetcher {
        let page_two = format!("{BASE}/p2");
        MapFetcher::new(&[
            (BASE, results_page(&["/l/1", "/l/2"])),
            (page_two.as_str(), results_page(&["/l/3", "/l/missing", "/l/plain"])),
            ("https://site.test/l/1", detail_page("1")),
            ("https://site.test/l/2", detail_page("2")),
            ("https://site.test/l/3", detail_page("3")),
            ("https://site.test/l/plain", "<html><body>sold</body></html>".to_string()),
        ])
    }

    #[tokio::test]
    async fn test_crawl_counts_every_outcome() {
        let crawler = Crawler::new(fixture(), 4);
        let mut sink = JsonLinesSink::new(Vec::new());

        let summary = crawler
            .run(&discoverer(PageCount::Explicit(3)), &mut sink)
            .await
            .unwrap();

        assert_eq!(
            summary,
            CrawlSummary {
                listing_pages: 3,
                listing_pages_failed: 1,
                detail_pages: 5,
                detail_pages_failed: 1,
                pages_without_listing: 1,
                records_written: 3,
                records_ignored: 0,
                sink_failures: 0,
            }
        );

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let mut ids: Vec<String> = out
            .lines()
            .map(|line| serde_json::from_str::<ListingRecord>(line).unwrap().listing_id)
            .collect();
        ids.sort();
        assert_eq!(ids, ["1", "2", "3"]);
        assert!(out.contains(r#""url":"https://site.test/l/2""#));
    }

    #[tokio::test]
    async fn test_sink_failures_do_not_stop_the_crawl() {
        let crawler = Crawler::new(fixture(), 1);
        let summary = crawler
            .run(&discoverer(PageCount::Explicit(2)), &mut FailingSink)
            .await
            .unwrap();

        assert_eq!(summary.sink_failures, 3);
        assert_eq!(summary.records_written, 0);
        assert_eq!(summary.detail_pages, 5);
    }

    #[tokio::test]
    async fn test_failed_discovery_aborts() {
        let crawler = Crawler::new(MapFetcher::new(&[]), 2);
        let mut sink = JsonLinesSink::new(Vec::new());

        assert!(crawler
            .run(&discoverer(PageCount::Discover), &mut sink)
            .await
            .is_err());
        assert_eq!(crawler.fetcher().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        let crawler = Crawler::new(MapFetcher::new(&[]), 0);
        assert_eq!(crawler.concurrency, 1);
    }
}
