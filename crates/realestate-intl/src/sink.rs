//! Record sinks.
//!
//! A sink takes ownership of one record at a time, keyed by `listing_id`.
//! Records without an id are ignored here rather than rejected upstream.

use crate::listing::ListingRecord;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to create data directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize listing {listing_id}: {source}")]
    Serialize {
        listing_id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write listing {listing_id}: {source}")]
    Write {
        listing_id: String,
        #[source]
        source: io::Error,
    },
}

/// What a sink did with a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOutcome {
    Written,
    /// The record had no `listing_id`.
    Ignored,
}

pub trait RecordSink {
    fn accept(&mut self, record: ListingRecord) -> Result<SinkOutcome, SinkError>;
}

/// Writes `<dir>/<listing_id>.json`, pretty-printed, one file per listing.
///
/// A listing seen again overwrites its previous file.
#[derive(Debug)]
pub struct JsonDirSink {
    dir: PathBuf,
    dir_ready: bool,
}

impl JsonDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            dir_ready: false,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where a listing with this id is stored.
    pub fn path_for(&self, listing_id: &str) -> PathBuf {
        self.dir.join(format!("{listing_id}.json"))
    }
}

impl RecordSink for JsonDirSink {
    fn accept(&mut self, record: ListingRecord) -> Result<SinkOutcome, SinkError> {
        if record.listing_id.is_empty() {
            return Ok(SinkOutcome::Ignored);
        }

        if !self.dir_ready {
            fs::create_dir_all(&self.dir).map_err(|source| SinkError::CreateDir {
                path: self.dir.clone(),
                source,
            })?;
            self.dir_ready = true;
        }

        let json = serde_json::to_string_pretty(&record).map_err(|source| SinkError::Serialize {
            listing_id: record.listing_id.clone(),
            source,
        })?;
        let path = self.path_for(&record.listing_id);
        fs::write(&path, json).map_err(|source| SinkError::Write {
            listing_id: record.listing_id.clone(),
            source,
        })?;

        tracing::info!("saved: {}", path.display());
        Ok(SinkOutcome::Written)
    }
}

/// Writes one compact JSON document per line.
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn accept(&mut self, record: ListingRecord) -> Result<SinkOutcome, SinkError> {
        if record.listing_id.is_empty() {
            return Ok(SinkOutcome::Ignored);
        }

        let line = serde_json::to_string(&record).map_err(|source| SinkError::Serialize {
            listing_id: record.listing_id.clone(),
            source,
        })?;
        writeln!(self.out, "{line}")
            .and_then(|()| self.out.flush())
            .map_err(|source| SinkError::Write {
                listing_id: record.listing_id.clone(),
                source,
            })?;
        Ok(SinkOutcome::Written)
    }
}
