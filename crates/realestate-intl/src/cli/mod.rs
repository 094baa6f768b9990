//! Subcommand implementations for the `realestate-intl` binary.

pub mod crawl_cmd;
pub mod extract_cmd;
pub mod pages_cmd;
