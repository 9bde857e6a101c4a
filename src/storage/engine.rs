use super::record_store::RecordStore;
use crate::core::DailyRecord;

/// Read side of a daily history, as consumed by the analytics engine.
///
/// Implemented by the on-disk [`RecordStore`] and by plain record slices, so
/// analytics can run against an in-memory history when the medium is gone.
pub trait HistorySource {
    /// Number of whole records available.
    fn record_count(&self) -> usize;

    /// The most recently written record.
    fn latest(&self) -> Option<DailyRecord>;

    /// The record `days_ago` positions before the latest, clamped to the oldest.
    fn at_offset_from_latest(&self, days_ago: usize) -> Option<DailyRecord>;

    /// Up to `max_days` most recent records, oldest first.
    fn history_window(&self, max_days: usize) -> Vec<DailyRecord>;
}

impl HistorySource for RecordStore {
    fn record_count(&self) -> usize {
        RecordStore::record_count(self)
    }

    fn latest(&self) -> Option<DailyRecord> {
        RecordStore::latest(self)
    }

    fn at_offset_from_latest(&self, days_ago: usize) -> Option<DailyRecord> {
        RecordStore::at_offset_from_latest(self, days_ago)
    }

    fn history_window(&self, max_days: usize) -> Vec<DailyRecord> {
        RecordStore::history_window(self, max_days)
    }
}

impl HistorySource for [DailyRecord] {
    fn record_count(&self) -> usize {
        self.len()
    }

    fn latest(&self) -> Option<DailyRecord> {
        self.last().copied()
    }

    fn at_offset_from_latest(&self, days_ago: usize) -> Option<DailyRecord> {
        let last = self.len().checked_sub(1)?;
        self.get(last.saturating_sub(days_ago)).copied()
    }

    fn history_window(&self, max_days: usize) -> Vec<DailyRecord> {
        let start = self.len() - max_days.min(self.len());
        self[start..].to_vec()
    }
}

impl HistorySource for Vec<DailyRecord> {
    fn record_count(&self) -> usize {
        self.as_slice().record_count()
    }

    fn latest(&self) -> Option<DailyRecord> {
        self.as_slice().latest()
    }

    fn at_offset_from_latest(&self, days_ago: usize) -> Option<DailyRecord> {
        self.as_slice().at_offset_from_latest(days_ago)
    }

    fn history_window(&self, max_days: usize) -> Vec<DailyRecord> {
        self.as_slice().history_window(max_days)
    }
}
