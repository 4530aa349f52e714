//! Partitioning rules.
//!
//! Both rules are pure functions of their inputs and preserve record order.

use chrono::{DateTime, Duration, FixedOffset, Utc, Weekday};

use crate::domain::{LocalTimeOfDay, RecordSet};
use crate::temporal::TargetZone;

/// Records split at a cutover instant. The boundary belongs to `after`.
#[derive(Debug, Clone, PartialEq)]
pub struct CutoverPartition {
    pub cutover: DateTime<FixedOffset>,
    pub before: RecordSet,
    pub after: RecordSet,
}

/// `before = local < cutover`, `after = local >= cutover`.
///
/// Instants compare absolutely, so a cutover written with a different offset
/// than the records still splits at the same moment.
pub fn partition_by_cutover(set: &RecordSet, cutover: DateTime<FixedOffset>) -> CutoverPartition {
    CutoverPartition {
        cutover,
        before: set.filter(|r| r.timestamp_local() < cutover),
        after: set.filter(|r| r.timestamp_local() >= cutover),
    }
}

/// A strictly positive rolling-window length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingWindow(Duration);

impl RollingWindow {
    pub fn new(duration: Duration) -> Option<Self> {
        (duration > Duration::zero()).then_some(Self(duration))
    }

    /// `None` for non-positive counts and for counts chrono cannot represent.
    pub fn minutes(minutes: i64) -> Option<Self> {
        Duration::try_minutes(minutes).and_then(Self::new)
    }

    pub fn duration(self) -> Duration {
        self.0
    }
}

/// The concrete slot a rolling window covers, anchored at `now`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    /// Weekday of `end` in local time; history must fall on the same weekday.
    pub weekday: Weekday,
    pub start_time: LocalTimeOfDay,
    pub end_time: LocalTimeOfDay,
}

impl SlotWindow {
    /// The window ending at `now`, with both ends localized in `zone`.
    ///
    /// Each end carries the offset in effect at that instant, so across a DST
    /// change `start` and `end` differ in offset. `None` when the start falls
    /// outside chrono's representable range.
    pub fn ending_at(now: DateTime<Utc>, window: RollingWindow, zone: &TargetZone) -> Option<Self> {
        let start = zone.to_local(now.checked_sub_signed(window.duration())?);
        let end = zone.to_local(now);
        Some(Self {
            start,
            end,
            weekday: chrono::Datelike::weekday(&end),
            start_time: LocalTimeOfDay::of(&start),
            end_time: LocalTimeOfDay::of(&end),
        })
    }

    /// The window spans a local date change.
    ///
    /// Time-of-day matching compares clock values only, so a crossing window
    /// has an inverted `[start_time, end_time]` range that matches nothing.
    /// Callers wanting history across midnight must split the window into
    /// same-day pieces themselves.
    pub fn crosses_midnight(&self) -> bool {
        self.start.date_naive() != self.end.date_naive()
    }

    pub fn contains_time_of_day(&self, tod: LocalTimeOfDay) -> bool {
        tod >= self.start_time && tod <= self.end_time
    }
}

/// Recent window vs matching historical slot.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentVsHistorical {
    pub window: SlotWindow,
    pub recent: RecordSet,
    pub historical: RecordSet,
}

/// Split out the last `window` before `now` and the same clock-time slot on
/// earlier occurrences of `now`'s local weekday in `zone`.
///
/// - recent: `local ∈ [now − window, now]`
/// - historical: `local < now − window`, same local weekday as `now`, and
///   local time of day within `[start_time, end_time]`
///
/// Returns `None` only when `now − window` is not representable.
pub fn partition_recent_vs_historical(
    set: &RecordSet,
    now: DateTime<Utc>,
    window: RollingWindow,
    zone: &TargetZone,
) -> Option<RecentVsHistorical> {
    let slot = SlotWindow::ending_at(now, window, zone)?;

    let recent = set.filter(|r| {
        let ts = r.timestamp_local();
        ts >= slot.start && ts <= slot.end
    });
    let historical = set.filter(|r| {
        r.timestamp_local() < slot.start
            && r.day_of_week() == slot.weekday
            && slot.contains_time_of_day(r.time_of_day())
    });

    Some(RecentVsHistorical {
        window: slot,
        recent,
        historical,
    })
}
