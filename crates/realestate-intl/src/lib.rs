// Copyright 2026 Agentra Labs Contributors
// SPDX-License-Identifier: MIT

//! Crawl international real-estate listings and rebuild each listing from the
//! Apollo cache snapshot embedded in its detail page.
//!
//! The pipeline, end to end:
//!
//! 1. [`acquisition::pagination`] derives every search-result page URL.
//! 2. [`acquisition::links`] pulls detail-page links off each result page.
//! 3. [`graph`] merges a detail page's inline JSON blocks into one fragment
//!    graph and resolves its cross-references.
//! 4. [`listing`] assembles a [`listing::ListingRecord`] from the graph, with
//!    HTML fallbacks for a few fields.
//! 5. [`sink`] stores the record.
//!
//! [`crawler::Crawler`] runs all of it with bounded concurrency.

pub mod acquisition;
pub mod cli;
pub mod config;
pub mod crawler;
pub mod graph;
pub mod listing;
pub mod sink;
