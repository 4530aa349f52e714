//! Declarative column alias table.
//!
//! Each canonical field lists the source headers it accepts, in priority
//! order, with the factor that converts the source unit into the canonical
//! one (`download (bps)` → Mbps is `1e-6`). Header matching is done once per
//! batch by `io::ingest`.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::CanonicalField;
use crate::error::AppError;

const BPS_TO_MBPS: f64 = 1e-6;

/// One accepted source column for a canonical field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnAlias {
    pub name: String,
    #[serde(default = "unit_scale")]
    pub scale: f64,
}

fn unit_scale() -> f64 {
    1.0
}

impl ColumnAlias {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scale: 1.0,
        }
    }

    pub fn scaled(name: impl Into<String>, scale: f64) -> Self {
        Self {
            name: name.into(),
            scale,
        }
    }
}

/// Canonical field → accepted source columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnAliasMap {
    aliases: BTreeMap<CanonicalField, Vec<ColumnAlias>>,
}

impl Default for ColumnAliasMap {
    fn default() -> Self {
        let mut aliases = BTreeMap::new();
        aliases.insert(
            CanonicalField::Timestamp,
            vec![
                ColumnAlias::new("timestamp (UTC)"),
                ColumnAlias::new("timestamp (in UTC)"),
                ColumnAlias::new("timestamp_utc"),
                ColumnAlias::new("timestamp"),
            ],
        );
        aliases.insert(
            CanonicalField::PingMs,
            vec![
                ColumnAlias::new("ping (ms)"),
                ColumnAlias::new("ping"),
                ColumnAlias::new("Ping Latency"),
            ],
        );
        aliases.insert(
            CanonicalField::DownloadMbps,
            vec![
                ColumnAlias::new("download (Mbps)"),
                ColumnAlias::scaled("download (bps)", BPS_TO_MBPS),
            ],
        );
        aliases.insert(
            CanonicalField::UploadMbps,
            vec![
                ColumnAlias::new("upload (Mbps)"),
                ColumnAlias::scaled("upload (bps)", BPS_TO_MBPS),
            ],
        );
        Self { aliases }
    }
}

impl ColumnAliasMap {
    pub fn aliases(&self, field: CanonicalField) -> &[ColumnAlias] {
        self.aliases.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace the accepted columns for one field.
    pub fn with_field(mut self, field: CanonicalField, aliases: Vec<ColumnAlias>) -> Self {
        self.aliases.insert(field, aliases);
        self
    }

    /// Load overrides from a JSON object keyed by canonical field name.
    ///
    /// Fields not named in the file keep the default aliases.
    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path)
            .map_err(|e| AppError::new(2, format!("Failed to open alias table '{}': {e}", path.display())))?;
        let overrides: BTreeMap<CanonicalField, Vec<ColumnAlias>> = serde_json::from_reader(file)
            .map_err(|e| AppError::new(2, format!("Invalid alias table '{}': {e}", path.display())))?;

        let mut map = Self::default();
        for (field, aliases) in overrides {
            if let Some(bad) = aliases.iter().find(|a| !(a.scale.is_finite() && a.scale > 0.0)) {
                return Err(AppError::new(
                    2,
                    format!("Alias '{}' for `{field}` has an invalid scale (must be finite and > 0).", bad.name),
                ));
            }
            map = map.with_field(field, aliases);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_table_covers_every_field() {
        let map = ColumnAliasMap::default();
        for field in CanonicalField::ALL {
            assert!(!map.aliases(field).is_empty(), "no aliases for {field}");
        }
        let bps = map
            .aliases(CanonicalField::DownloadMbps)
            .iter()
            .find(|a| a.name == "download (bps)")
            .unwrap();
        assert!((bps.scale - 1e-6).abs() < 1e-18);
    }

    #[test]
    fn json_overrides_replace_only_named_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"ping_ms": [{{"name": "latency"}}]}}"#).unwrap();

        let map = ColumnAliasMap::from_json_file(file.path()).unwrap();
        assert_eq!(map.aliases(CanonicalField::PingMs), &[ColumnAlias::new("latency")]);
        assert_eq!(
            map.aliases(CanonicalField::UploadMbps),
            ColumnAliasMap::default().aliases(CanonicalField::UploadMbps)
        );
    }

    #[test]
    fn json_override_rejects_non_positive_scale() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"upload_mbps": [{{"name": "up", "scale": 0}}]}}"#).unwrap();
        let err = ColumnAliasMap::from_json_file(file.path()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
