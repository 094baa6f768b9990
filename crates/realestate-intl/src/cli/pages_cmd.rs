//! `realestate-intl pages`: print the search-result page URLs.

use crate::acquisition::HttpClient;
use crate::config::{CrawlConfig, SiteArgs};
use anyhow::{Context, Result};

/// Run the pages command.
pub async fn run(args: &SiteArgs, json: bool) -> Result<()> {
    let config = CrawlConfig::from_site(args)?;
    let client = HttpClient::new(config.timeout_ms).context("failed to set up HTTP client")?;
    let urls = config.discoverer().discover(&client).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&urls)?);
    } else {
        for url in &urls {
            println!("{url}");
        }
    }
    Ok(())
}
