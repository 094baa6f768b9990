//! `realestate-intl extract`: rebuild the listing on a single detail page.

use crate::acquisition::HttpClient;
use crate::listing::extract_listing;
use crate::sink::{JsonLinesSink, RecordSink};
use anyhow::{Context, Result};
use std::path::Path;
use url::Url;

/// Run the extract command.
///
/// `target` is either an http(s) URL, fetched live, or a local HTML file. A
/// local file takes its page URL from `page_url`, falling back to its
/// `file://` URL.
pub async fn run(target: &str, page_url: Option<&str>, timeout_ms: u64) -> Result<()> {
    let (url, html) = if is_remote(target) {
        let client = HttpClient::new(timeout_ms).context("failed to set up HTTP client")?;
        let resp = client.get(target).await?;
        (resp.final_url, resp.body)
    } else {
        let html = std::fs::read_to_string(target)
            .with_context(|| format!("failed to read {target}"))?;
        let url = match page_url {
            Some(url) => url.to_string(),
            None => file_url(Path::new(target)),
        };
        (url, html)
    };

    let Some(record) = extract_listing(&url, &html) else {
        tracing::info!("no listing found on {url}");
        return Ok(());
    };

    let stdout = std::io::stdout();
    JsonLinesSink::new(stdout.lock()).accept(record)?;
    Ok(())
}

fn is_remote(target: &str) -> bool {
    Url::parse(target).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

fn file_url(path: &Path) -> String {
    std::fs::canonicalize(path)
        .ok()
        .and_then(|abs| Url::from_file_path(abs).ok())
        .map(String::from)
        .unwrap_or_else(|| path.display().to_string())
}
