//! Derive local calendar features for canonical records.

use crate::domain::{CanonicalRecord, EnrichedRecord, RecordSet};
use crate::temporal::TargetZone;

/// Enrich a batch of canonical records in `zone`.
///
/// Weekday and day type come from the *local* date, so an evening UTC
/// measurement can land on the next local day.
pub fn enrich(records: &[CanonicalRecord], zone: &TargetZone) -> RecordSet {
    RecordSet::from_records(records.iter().map(|r| enrich_one(*r, zone)).collect())
}

pub fn enrich_one(record: CanonicalRecord, zone: &TargetZone) -> EnrichedRecord {
    EnrichedRecord::new(record, zone.to_local(record.timestamp_utc))
}
