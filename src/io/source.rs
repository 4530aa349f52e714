//! Raw record sources: local delimited files and remote sheet exports.
//!
//! Both hand the engine a fully materialized `RawBatch` or a single
//! `SourceUnreadable` failure. Retries, if wanted, belong to the caller.

use std::fs::File;
use std::path::PathBuf;

use reqwest::blocking::Client;

use crate::domain::SourceSpec;
use crate::error::PrepError;
use crate::io::ingest::{RawBatch, read_raw_batch};

pub trait RawSource {
    /// Human-readable name for messages.
    fn name(&self) -> String;

    fn fetch(&self) -> Result<RawBatch, PrepError>;
}

/// Delimited file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RawSource for FileSource {
    fn name(&self) -> String {
        format!("'{}'", self.path.display())
    }

    fn fetch(&self) -> Result<RawBatch, PrepError> {
        let file = File::open(&self.path).map_err(|e| PrepError::unreadable(self.name(), e))?;
        read_raw_batch(file, &self.name())
    }
}

/// A spreadsheet published as CSV (e.g. a sheet's "export as CSV" link).
///
/// Any failure (network, HTTP status, body) collapses into one opaque
/// `SourceUnreadable`.
pub struct SheetSource {
    client: Client,
    url: String,
}

impl SheetSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

impl RawSource for SheetSource {
    fn name(&self) -> String {
        "remote sheet".to_string()
    }

    fn fetch(&self) -> Result<RawBatch, PrepError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| PrepError::unreadable(self.name(), format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(PrepError::unreadable(
                self.name(),
                format!("request failed with status {}", resp.status()),
            ));
        }

        let body = resp
            .text()
            .map_err(|e| PrepError::unreadable(self.name(), format!("failed to read response body: {e}")))?;

        read_raw_batch(body.as_bytes(), &self.name())
    }
}

pub fn open_source(spec: &SourceSpec) -> Box<dyn RawSource> {
    match spec {
        SourceSpec::File(path) => Box::new(FileSource::new(path.clone())),
        SourceSpec::Sheet(url) => Box::new(SheetSource::new(url.clone())),
    }
}
