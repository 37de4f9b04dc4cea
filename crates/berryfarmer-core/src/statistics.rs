//! Runtime and yield statistics shown to the operator.
//!
//! Active runtime accumulates every tick, but only from gaps shorter than
//! the pause threshold: a long gap means the host was paused or detached,
//! and that time must not count toward the hourly yield rate.
//!
//! The display itself is refreshed on a cooldown. On the first refresh the
//! tracker snapshots the berries already in the inventory as a baseline;
//! later refreshes report `current - baseline` as the amount gained. These
//! numbers are presentation only and never feed back into decisions.

use std::collections::BTreeMap;

use berryfarmer_types::{BerryType, InventoryItem};
use tracing::info;

use crate::equipment;
use crate::host::{StatisticsSink, WorldView};
use crate::locator;
use crate::throttle::{ActionThrottle, KEY_UPDATE_STATISTIC};

const MS_PER_SECOND: f64 = 1000.0;
const SECONDS_PER_MINUTE: f64 = 60.0;
const MINUTES_PER_HOUR: f64 = 60.0;

/// A badge in the operator's statistics panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Badge {
    /// Active runtime as `HH:MM:SS`.
    Runtime,
    /// Berries collected since start, with hourly rate.
    Collected(BerryType),
    /// Bushes of this type currently visible.
    Nearby(BerryType),
}

/// Accumulated active runtime.
#[derive(Debug, Clone)]
pub struct RuntimeAccumulator {
    last_tick_at: Option<u64>,
    total_ms: u64,
    pause_threshold_ms: u64,
}

impl RuntimeAccumulator {
    /// Create an empty accumulator.
    pub const fn new(pause_threshold_ms: u64) -> Self {
        Self {
            last_tick_at: None,
            total_ms: 0,
            pause_threshold_ms,
        }
    }

    /// Record a tick at `now_ms`. Returns the milliseconds added.
    ///
    /// The first tick adds nothing. Gaps at or above the pause threshold
    /// are dropped.
    pub fn track(&mut self, now_ms: u64) -> u64 {
        let added = self
            .last_tick_at
            .map(|last| now_ms.saturating_sub(last))
            .filter(|gap| *gap < self.pause_threshold_ms)
            .unwrap_or(0);
        self.total_ms = self.total_ms.saturating_add(added);
        self.last_tick_at = Some(now_ms);
        added
    }

    /// Total active milliseconds.
    pub const fn total_ms(&self) -> u64 {
        self.total_ms
    }

    /// Total active seconds.
    pub fn seconds(&self) -> f64 {
        ms_as_f64(self.total_ms) / MS_PER_SECOND
    }

    /// Total active minutes.
    pub fn minutes(&self) -> f64 {
        self.seconds() / SECONDS_PER_MINUTE
    }

    /// Total active hours.
    pub fn hours(&self) -> f64 {
        self.minutes() / MINUTES_PER_HOUR
    }

    /// Runtime formatted as `HH:MM:SS`.
    pub fn format_hms(&self) -> String {
        let seconds = self.total_ms / 1000;
        let hours = seconds / 3600;
        let minutes = (seconds / 60) % 60;
        let secs = seconds % 60;
        format!("{hours:02}:{minutes:02}:{secs:02}")
    }
}

/// Yield of one berry type since the baseline was taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YieldStat {
    /// Count held when statistics started.
    pub baseline: u32,
    /// Count held now.
    pub current: u32,
    /// `current - baseline`; negative if berries were sold or dropped.
    pub gained: i64,
    /// `gained / max(1, active hours)`.
    pub per_hour: f64,
}

impl YieldStat {
    /// Badge text: `baseline + gained (rate/hour)`.
    pub fn display(&self) -> String {
        format!("{} + {} ({:.1}/hour)", self.baseline, self.gained, self.per_hour)
    }
}

/// One refresh of the statistics panel.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsReport {
    /// Runtime as `HH:MM:SS`.
    pub runtime: String,
    /// Yield per berry type.
    pub yields: BTreeMap<BerryType, YieldStat>,
    /// Visible bushes per berry type.
    pub nearby: BTreeMap<BerryType, u32>,
}

impl StatisticsReport {
    /// Write every badge to the sink.
    pub fn publish(&self, sink: &mut (impl StatisticsSink + ?Sized)) {
        sink.set_badge(Badge::Runtime, self.runtime.clone());
        for (berry, stat) in &self.yields {
            sink.set_badge(Badge::Collected(*berry), stat.display());
        }
        for (berry, count) in &self.nearby {
            sink.set_badge(Badge::Nearby(*berry), count.to_string());
        }
    }
}

/// Runtime accumulator plus yield baseline.
#[derive(Debug, Clone)]
pub struct StatisticsTracker {
    runtime: RuntimeAccumulator,
    baseline: Option<BTreeMap<BerryType, u32>>,
    refresh_interval_ms: u64,
    last_report: Option<StatisticsReport>,
}

impl StatisticsTracker {
    /// Create a tracker.
    pub const fn new(pause_threshold_ms: u64, refresh_interval_ms: u64) -> Self {
        Self {
            runtime: RuntimeAccumulator::new(pause_threshold_ms),
            baseline: None,
            refresh_interval_ms,
            last_report: None,
        }
    }

    /// Accumulate runtime for this tick.
    pub fn track_runtime(&mut self, now_ms: u64) -> u64 {
        self.runtime.track(now_ms)
    }

    /// Refresh the display if the cooldown allows it.
    ///
    /// Returns the new report when a refresh happened.
    pub fn update_display<H>(
        &mut self,
        now_ms: u64,
        throttle: &mut ActionThrottle,
        host: &mut H,
    ) -> Option<&StatisticsReport>
    where
        H: WorldView + StatisticsSink + ?Sized,
    {
        throttle.run_throttled(now_ms, KEY_UPDATE_STATISTIC, self.refresh_interval_ms, || ())?;

        let inventory = host.inventory();
        let current = berry_counts(&inventory);
        let nearby = locator::count_nearby(&host.nearby_materials());

        let report = self.refresh(current, nearby);
        report.publish(host);
        info!(
            runtime = %report.runtime,
            collected = ?report.yields.iter().map(|(b, s)| (b.as_str(), s.gained)).collect::<Vec<_>>(),
            "Statistics refreshed"
        );
        self.last_report.as_ref()
    }

    /// Compute a report from the current counts, taking the baseline on
    /// the first call.
    pub fn refresh(
        &mut self,
        current: BTreeMap<BerryType, u32>,
        nearby: BTreeMap<BerryType, u32>,
    ) -> &StatisticsReport {
        let baseline = self.baseline.get_or_insert_with(|| current.clone());
        let hours = self.runtime.hours().max(1.0);

        let yields = current
            .iter()
            .map(|(berry, now)| {
                let base = baseline.get(berry).copied().unwrap_or(0);
                let gained = i64::from(*now).saturating_sub(i64::from(base));
                let stat = YieldStat {
                    baseline: base,
                    current: *now,
                    gained,
                    per_hour: gained_as_f64(gained) / hours,
                };
                (*berry, stat)
            })
            .collect();

        self.last_report.insert(StatisticsReport {
            runtime: self.runtime.format_hms(),
            yields,
            nearby,
        })
    }

    /// The runtime accumulator.
    pub const fn runtime(&self) -> &RuntimeAccumulator {
        &self.runtime
    }

    /// The yield baseline, once taken.
    pub const fn baseline(&self) -> Option<&BTreeMap<BerryType, u32>> {
        self.baseline.as_ref()
    }

    /// The most recent report.
    pub const fn last_report(&self) -> Option<&StatisticsReport> {
        self.last_report.as_ref()
    }
}

/// Count every berry type in the inventory.
pub fn berry_counts(inventory: &[InventoryItem]) -> BTreeMap<BerryType, u32> {
    BerryType::ALL
        .into_iter()
        .map(|berry| (berry, equipment::find_item(inventory, berry.item_id()).total))
        .collect()
}

// Active runtime stays far below 2^52 ms, so the conversion is exact.
#[allow(clippy::cast_precision_loss)]
fn ms_as_f64(ms: u64) -> f64 {
    ms as f64
}

// Berry counts are bounded by u32 differences.
#[allow(clippy::cast_precision_loss)]
fn gained_as_f64(gained: i64) -> f64 {
    gained as f64
}

#[cfg(test)]
mod tests {
    use berryfarmer_types::ItemId;

    use super::*;

    fn counts(cloud: u32, light: u32, exo: u32) -> BTreeMap<BerryType, u32> {
        BTreeMap::from([
            (BerryType::Cloudberry, cloud),
            (BerryType::Lightberry, light),
            (BerryType::Exoberry, exo),
        ])
    }

    #[test]
    fn first_tick_adds_nothing() {
        let mut runtime = RuntimeAccumulator::new(1000);
        assert_eq!(runtime.track(50_000), 0);
        assert_eq!(runtime.total_ms(), 0);
    }

    #[test]
    fn short_gaps_accumulate_exactly() {
        let mut runtime = RuntimeAccumulator::new(1000);
        runtime.track(0);
        assert_eq!(runtime.track(100), 100);
        assert_eq!(runtime.track(250), 150);
        assert_eq!(runtime.track(1249), 999);
        assert_eq!(runtime.total_ms(), 1249);
    }

    #[test]
    fn pause_gap_is_excluded() {
        let mut runtime = RuntimeAccumulator::new(1000);
        runtime.track(0);
        runtime.track(100);
        assert_eq!(runtime.track(1100), 0);
        assert_eq!(runtime.total_ms(), 100);
        // Accumulation resumes from the post-pause tick.
        assert_eq!(runtime.track(1200), 100);
        assert_eq!(runtime.total_ms(), 200);
    }

    #[test]
    fn derived_units_and_format() {
        let mut runtime = RuntimeAccumulator::new(u64::MAX);
        runtime.track(0);
        runtime.track(3_723_000);
        assert!((runtime.seconds() - 3723.0).abs() < 1e-9);
        assert!((runtime.minutes() - 62.05).abs() < 1e-9);
        assert!((runtime.hours() - 3723.0 / 3600.0).abs() < 1e-9);
        assert_eq!(runtime.format_hms(), "01:02:03");
    }

    #[test]
    fn baseline_is_fixed_at_first_refresh() {
        let mut tracker = StatisticsTracker::new(1000, 2000);
        tracker.refresh(counts(10, 0, 5), BTreeMap::new());
        tracker.refresh(counts(3, 4, 5), BTreeMap::new());
        let report = tracker.refresh(counts(15, 2, 5), BTreeMap::new()).clone();

        assert_eq!(tracker.baseline(), Some(&counts(10, 0, 5)));
        let cloud = report.yields.get(&BerryType::Cloudberry).copied();
        assert_eq!(cloud.map(|s| s.gained), Some(5));
        assert_eq!(cloud.map(|s| s.baseline), Some(10));
    }

    #[test]
    fn rate_divides_by_at_least_one_hour() {
        let mut tracker = StatisticsTracker::new(u64::MAX, 2000);
        tracker.track_runtime(0);
        tracker.track_runtime(30 * 60 * 1000);
        tracker.refresh(counts(0, 0, 0), BTreeMap::new());
        let report = tracker.refresh(counts(12, 0, 0), BTreeMap::new()).clone();
        let cloud = report.yields.get(&BerryType::Cloudberry).copied();
        assert!(cloud.is_some_and(|s| (s.per_hour - 12.0).abs() < 1e-9));
        assert_eq!(report.runtime, "00:30:00");
    }

    #[test]
    fn rate_uses_elapsed_hours_after_first_hour() {
        let mut tracker = StatisticsTracker::new(u64::MAX, 2000);
        tracker.track_runtime(0);
        tracker.refresh(counts(0, 0, 0), BTreeMap::new());
        tracker.track_runtime(2 * 60 * 60 * 1000);
        let report = tracker.refresh(counts(0, 30, 0), BTreeMap::new()).clone();
        let light = report.yields.get(&BerryType::Lightberry).copied();
        assert!(light.is_some_and(|s| (s.per_hour - 15.0).abs() < 1e-9));
    }

    #[test]
    fn losses_report_negative_gain() {
        let mut tracker = StatisticsTracker::new(1000, 2000);
        tracker.refresh(counts(0, 0, 20), BTreeMap::new());
        let report = tracker.refresh(counts(0, 0, 15), BTreeMap::new()).clone();
        let exo = report.yields.get(&BerryType::Exoberry).copied();
        assert_eq!(exo.map(|s| s.gained), Some(-5));
        assert_eq!(exo.map(|s| s.display()), Some("20 + -5 (-5.0/hour)".to_owned()));
    }

    #[test]
    fn berry_counts_sum_stacks() {
        let stack = |item: u32, slot: u32, quantity: u32| InventoryItem {
            item_id: ItemId(item),
            upgrade_level: 0,
            slot,
            equipped: None,
            quantity,
        };
        let inventory = [stack(3400, 0, 5), stack(3400, 1, 7), stack(3402, 2, 1), stack(1, 3, 99)];
        assert_eq!(berry_counts(&inventory), counts(12, 0, 1));
    }

    #[derive(Default)]
    struct BadgeBoard(BTreeMap<Badge, String>);

    impl StatisticsSink for BadgeBoard {
        fn set_badge(&mut self, badge: Badge, value: String) {
            self.0.insert(badge, value);
        }
    }

    #[test]
    fn report_publishes_every_badge() {
        let mut tracker = StatisticsTracker::new(1000, 2000);
        let report = tracker.refresh(counts(1, 2, 3), counts(4, 0, 1)).clone();
        let mut board = BadgeBoard::default();
        report.publish(&mut board);

        assert_eq!(board.0.get(&Badge::Runtime).map(String::as_str), Some("00:00:00"));
        assert_eq!(
            board.0.get(&Badge::Collected(BerryType::Lightberry)).map(String::as_str),
            Some("2 + 0 (0.0/hour)")
        );
        assert_eq!(board.0.get(&Badge::Nearby(BerryType::Cloudberry)).map(String::as_str), Some("4"));
        assert_eq!(board.0.len(), 7);
    }
}
