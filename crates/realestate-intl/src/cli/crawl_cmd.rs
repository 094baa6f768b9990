//! `realestate-intl crawl`: every listing of one country into a data directory.

use crate::acquisition::HttpClient;
use crate::config::{CrawlArgs, CrawlConfig};
use crate::crawler::Crawler;
use crate::sink::JsonDirSink;
use anyhow::{Context, Result};

/// Run the crawl command.
pub async fn run(args: &CrawlArgs, json: bool) -> Result<()> {
    let config = CrawlConfig::from_crawl(args)?;
    tracing::info!(
        "crawling {} (pages: {:?}, concurrency {})",
        config.site().base_url(),
        config.page_count(),
        config.concurrency
    );

    let client = HttpClient::new(config.timeout_ms).context("failed to set up HTTP client")?;
    let crawler = Crawler::new(client, config.concurrency);
    let mut sink = JsonDirSink::new(&config.data_dir);

    let summary = crawler.run(&config.discoverer(), &mut sink).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
        println!("records in {}", sink.dir().display());
    }
    Ok(())
}
