//! Grouped means.
//!
//! Groups only exist for keys present in the data. Use `reindex` to lay a
//! result onto a canonical axis (24 hours, Monday..Sunday); missing keys come
//! back as `None`, meaning "no data", never zero.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::Weekday;
use serde::Serialize;

use crate::domain::{DayType, EnrichedRecord, Metric, RecordSet};

/// Per-group means of each metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupMeans {
    pub count: usize,
    pub ping_ms: f64,
    pub download_mbps: f64,
    pub upload_mbps: f64,
}

impl GroupMeans {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::PingMs => self.ping_ms,
            Metric::DownloadMbps => self.download_mbps,
            Metric::UploadMbps => self.upload_mbps,
        }
    }
}

/// Running sums for one group.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MeanAccumulator {
    count: usize,
    ping_ms: f64,
    download_mbps: f64,
    upload_mbps: f64,
}

impl MeanAccumulator {
    pub(crate) fn add(&mut self, record: &EnrichedRecord) {
        self.count += 1;
        self.ping_ms += record.value(Metric::PingMs);
        self.download_mbps += record.value(Metric::DownloadMbps);
        self.upload_mbps += record.value(Metric::UploadMbps);
    }

    /// Only called on accumulators that saw at least one record.
    pub(crate) fn finish(&self) -> GroupMeans {
        let n = self.count as f64;
        GroupMeans {
            count: self.count,
            ping_ms: self.ping_ms / n,
            download_mbps: self.download_mbps / n,
            upload_mbps: self.upload_mbps / n,
        }
    }
}

/// Group by a caller-supplied key and average each metric per group.
pub fn group_by<K, F>(set: &RecordSet, key_fn: F) -> HashMap<K, GroupMeans>
where
    K: Eq + Hash,
    F: Fn(&EnrichedRecord) -> K,
{
    let mut groups: HashMap<K, MeanAccumulator> = HashMap::new();
    for record in set {
        groups.entry(key_fn(record)).or_default().add(record);
    }
    groups.into_iter().map(|(k, acc)| (k, acc.finish())).collect()
}

pub fn by_hour(set: &RecordSet) -> HashMap<u32, GroupMeans> {
    group_by(set, EnrichedRecord::hour_of_day)
}

pub fn by_day_of_week(set: &RecordSet) -> HashMap<Weekday, GroupMeans> {
    group_by(set, EnrichedRecord::day_of_week)
}

pub fn by_day_type_hour(set: &RecordSet) -> HashMap<(DayType, u32), GroupMeans> {
    group_by(set, |r| (r.day_type(), r.hour_of_day()))
}

/// Lay grouped results onto a fixed key order.
pub fn reindex<K, I>(groups: &HashMap<K, GroupMeans>, keys: I) -> Vec<(K, Option<GroupMeans>)>
where
    K: Eq + Hash,
    I: IntoIterator<Item = K>,
{
    keys.into_iter()
        .map(|k| {
            let means = groups.get(&k).copied();
            (k, means)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone, Utc};

    use crate::domain::{CanonicalRecord, WEEKDAYS};
    use crate::temporal::{TargetZone, enrich};

    fn set(points: &[(u32, u32, f64)]) -> RecordSet {
        // (day of Jan 2025, UTC hour, download)
        let records: Vec<CanonicalRecord> = points
            .iter()
            .map(|&(day, hour, download)| CanonicalRecord {
                timestamp_utc: Utc.with_ymd_and_hms(2025, 1, day, hour, 0, 0).unwrap(),
                ping_ms: 10.0,
                download_mbps: download,
                upload_mbps: 20.0,
            })
            .collect();
        enrich(&records, &TargetZone::Fixed(FixedOffset::east_opt(9 * 3600).unwrap()))
    }

    #[test]
    fn hourly_means_only_contain_observed_hours() {
        // 00:00Z on two different days, both 09:00 local.
        let groups = by_hour(&set(&[(1, 0, 50.0), (2, 0, 60.0)]));
        assert_eq!(groups.len(), 1);
        let nine = groups[&9];
        assert_eq!(nine.count, 2);
        assert!((nine.download_mbps - 55.0).abs() < 1e-12);
        assert!(!groups.contains_key(&10));
    }

    #[test]
    fn reindex_marks_missing_days_as_no_data() {
        // 2025-01-01 is a Wednesday (local +09:00 at 09:00).
        let groups = by_day_of_week(&set(&[(1, 0, 50.0)]));
        let axis = reindex(&groups, WEEKDAYS);
        assert_eq!(axis.len(), 7);
        assert_eq!(axis[0].0, Weekday::Mon);
        assert!(axis[0].1.is_none());
        assert!((axis[2].1.unwrap().download_mbps - 50.0).abs() < 1e-12);
        assert_eq!(axis.iter().filter(|(_, m)| m.is_some()).count(), 1);
    }

    #[test]
    fn day_type_hour_keys_split_weekend_from_weekday() {
        // Jan 4 2025 is a Saturday.
        let groups = by_day_type_hour(&set(&[(1, 0, 50.0), (4, 0, 80.0)]));
        assert!((groups[&(DayType::Weekday, 9)].download_mbps - 50.0).abs() < 1e-12);
        assert!((groups[&(DayType::Weekend, 9)].download_mbps - 80.0).abs() < 1e-12);
    }

    #[test]
    fn empty_set_has_no_groups() {
        assert!(by_hour(&RecordSet::default()).is_empty());
    }
}
