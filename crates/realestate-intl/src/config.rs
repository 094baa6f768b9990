//! Crawl configuration: command-line flags with environment fallbacks,
//! validated into a [`CrawlConfig`] before anything touches the network.

use crate::acquisition::pagination::{ListingSite, PageCount, PaginationDiscoverer};
use clap::Args;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

pub const DEFAULT_ORIGIN: &str = "https://www.realestate.com.au";
pub const DEFAULT_COUNTRY: &str = "id";
pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid origin {origin:?}: {reason}")]
    InvalidOrigin { origin: String, reason: String },
    #[error("origin must use http or https, got {0:?}")]
    UnsupportedScheme(String),
    #[error("invalid country code {0:?}: expected ASCII letters, digits, '-' or '_'")]
    InvalidCountry(String),
    #[error("--max-pages must be at least 1")]
    ZeroPages,
    #[error("--concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("--timeout must be greater than 0")]
    ZeroTimeout,
}

/// Which site to read and how to find its result pages.
#[derive(Args, Debug, Clone)]
pub struct SiteArgs {
    /// Site origin the search-results path hangs off
    #[arg(long, env = "REINTL_ORIGIN", default_value = DEFAULT_ORIGIN)]
    pub origin: String,

    /// Country code of the international listings section (e.g. "id")
    #[arg(long, env = "REINTL_COUNTRY", default_value = DEFAULT_COUNTRY)]
    pub country: String,

    /// Number of result pages to visit; discovered from page 1 when omitted
    #[arg(long, env = "REINTL_MAX_PAGES")]
    pub max_pages: Option<u32>,

    /// Per-request timeout in milliseconds
    #[arg(long = "timeout", env = "REINTL_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,
}

/// Flags of the full crawl.
#[derive(Args, Debug, Clone)]
pub struct CrawlArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Maximum pages fetched at once
    #[arg(long, env = "REINTL_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Directory that receives one JSON file per listing
    #[arg(long, env = "REINTL_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,
}

/// Validated crawl settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    pub origin: Url,
    pub country_code: String,
    pub max_pages: Option<u32>,
    pub concurrency: usize,
    pub timeout_ms: u64,
    pub data_dir: PathBuf,
}

impl CrawlConfig {
    /// Site settings only; concurrency and output keep their defaults.
    pub fn from_site(args: &SiteArgs) -> Result<Self, ConfigError> {
        Self::build(args, DEFAULT_CONCURRENCY, PathBuf::from(DEFAULT_DATA_DIR))
    }

    pub fn from_crawl(args: &CrawlArgs) -> Result<Self, ConfigError> {
        Self::build(&args.site, args.concurrency, args.data_dir.clone())
    }

    fn build(site: &SiteArgs, concurrency: usize, data_dir: PathBuf) -> Result<Self, ConfigError> {
        let config = Self {
            origin: parse_origin(&site.origin)?,
            country_code: site.country.trim().to_string(),
            max_pages: site.max_pages,
            concurrency,
            timeout_ms: site.timeout_ms,
            data_dir,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.origin.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(self.origin.scheme().to_string()));
        }
        let country_ok = !self.country_code.is_empty()
            && self
                .country_code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !country_ok {
            return Err(ConfigError::InvalidCountry(self.country_code.clone()));
        }
        if self.max_pages == Some(0) {
            return Err(ConfigError::ZeroPages);
        }
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn site(&self) -> ListingSite {
        ListingSite::new(&self.origin, &self.country_code)
    }

    pub fn page_count(&self) -> PageCount {
        PageCount::from(self.max_pages)
    }

    pub fn discoverer(&self) -> PaginationDiscoverer {
        PaginationDiscoverer::new(self.site(), self.page_count())
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            origin: Url::parse(DEFAULT_ORIGIN).unwrap(),
            country_code: DEFAULT_COUNTRY.to_string(),
            max_pages: None,
            concurrency: DEFAULT_CONCURRENCY,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

fn parse_origin(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidOrigin {
        origin: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(ConfigError::InvalidOrigin {
            origin: raw.to_string(),
            reason: "not an absolute URL with a host".to_string(),
        });
    }
    Ok(url)
}
