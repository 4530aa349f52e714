//! Time-to-live cache in front of the raw load step.
//!
//! Repeated analysis runs within the TTL reuse the same raw fetch. Only
//! successful loads are cached. The cache never touches the engine's
//! correctness: it stores raw batches, and every run re-normalizes them.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::clock::Clock;
use crate::error::PrepError;
use crate::io::ingest::RawBatch;

/// Default TTL of the load cache.
pub const DEFAULT_TTL_SECS: i64 = 600;

/// How a `get_or_load` call was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    Expired,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    fetched_at: DateTime<Utc>,
    batch: RawBatch,
}

#[derive(Debug)]
pub struct LoadCache<C: Clock> {
    clock: C,
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl<C: Clock> LoadCache<C> {
    pub fn new(clock: C, ttl: Duration) -> Self {
        Self {
            clock,
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Return the cached batch for `key`, or run `load` and cache its result.
    pub fn get_or_load<F>(&mut self, key: &str, load: F) -> Result<(RawBatch, CacheStatus), PrepError>
    where
        F: FnOnce() -> Result<RawBatch, PrepError>,
    {
        let now = self.clock.now();
        let status = match self.entries.get(key) {
            Some(entry) if now - entry.fetched_at < self.ttl => {
                return Ok((entry.batch.clone(), CacheStatus::Hit));
            }
            Some(_) => CacheStatus::Expired,
            None => CacheStatus::Miss,
        };

        let batch = match load() {
            Ok(batch) => batch,
            Err(err) => {
                self.entries.remove(key);
                return Err(err);
            }
        };
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                fetched_at: now,
                batch: batch.clone(),
            },
        );
        Ok((batch, status))
    }
}
