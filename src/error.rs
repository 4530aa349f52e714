//! Error types.
//!
//! - `PrepError`: typed failures of the data-preparation engine (load, schema,
//!   cleaning). Callers can tell "wrong file" from "right file, bad data".
//! - `AppError`: the binary boundary. Carries a process exit code and a
//!   human-readable message.

use crate::domain::CanonicalField;

/// Failures raised while turning a raw source into a canonical record set.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PrepError {
    #[error("load: could not read {source_name}: {reason}")]
    SourceUnreadable { source_name: String, reason: String },

    #[error("normalize: missing required columns after alias resolution: {}", fmt_fields(.missing))]
    SchemaMismatch { missing: Vec<CanonicalField> },

    #[error("normalize: no valid rows remain after cleaning ({rejected} of {rows} rows rejected)")]
    EmptyAfterCleaning { rows: usize, rejected: usize },
}

impl PrepError {
    pub fn unreadable(source_name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::SourceUnreadable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

fn fmt_fields(fields: &[CanonicalField]) -> String {
    let names: Vec<&str> = fields.iter().map(|f| f.as_str()).collect();
    names.join(", ")
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PrepError> for AppError {
    fn from(err: PrepError) -> Self {
        let exit_code = match err {
            PrepError::SourceUnreadable { .. } | PrepError::SchemaMismatch { .. } => 2,
            PrepError::EmptyAfterCleaning { .. } => 3,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_mismatch_lists_every_missing_field() {
        let err = PrepError::SchemaMismatch {
            missing: vec![CanonicalField::PingMs, CanonicalField::UploadMbps],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("normalize:"));
        assert!(msg.contains("ping_ms, upload_mbps"));
    }

    #[test]
    fn prep_errors_map_to_distinct_exit_codes() {
        let schema: AppError = PrepError::SchemaMismatch { missing: vec![] }.into();
        let empty: AppError = PrepError::EmptyAfterCleaning { rows: 3, rejected: 3 }.into();
        let load: AppError = PrepError::unreadable("data.csv", "not found").into();
        assert_eq!(schema.exit_code(), 2);
        assert_eq!(load.exit_code(), 2);
        assert_eq!(empty.exit_code(), 3);
        assert!(load.to_string().contains("data.csv"));
    }
}
