// Copyright 2026 Agentra Labs Contributors
// SPDX-License-Identifier: MIT

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use realestate_intl::cli;
use realestate_intl::config::{CrawlArgs, SiteArgs, DEFAULT_TIMEOUT_MS};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "realestate-intl",
    about = "Crawl international real-estate listings into structured JSON",
    version,
    after_help = "Run 'realestate-intl <command> --help' for details on each command."
)]
struct Cli {
    /// Emit logs and summaries as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl every listing of one country into a data directory
    Crawl(CrawlArgs),
    /// Print the search-result page URLs that a crawl would visit
    Pages(SiteArgs),
    /// Extract the listing on one detail page and print it as JSON
    Extract {
        /// Detail page URL, or a saved HTML file
        target: String,
        /// Page URL of a saved HTML file, used for the record and relative links
        #[arg(long)]
        url: Option<String>,
        /// Request timeout in milliseconds
        #[arg(long = "timeout", env = "REINTL_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
        timeout_ms: u64,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn init_tracing(verbose: bool, json: bool) {
    let default_directive = if verbose {
        "realestate_intl=debug"
    } else {
        "realestate_intl=info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json);

    let result = match cli.command {
        Commands::Crawl(args) => cli::crawl_cmd::run(&args, cli.json).await,
        Commands::Pages(args) => cli::pages_cmd::run(&args, cli.json).await,
        Commands::Extract {
            target,
            url,
            timeout_ms,
        } => cli::extract_cmd::run(&target, url.as_deref(), timeout_ms).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "realestate-intl", &mut std::io::stdout());
            Ok(())
        }
    };

    // 0=success, 1=error
    if let Err(e) = &result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }

    result
}
