use crate::storage::HistorySource;
use tracing::debug;

/// Percentage change from the record `days_ago` back to the latest one.
///
/// `None` when fewer than two records exist, a record cannot be read, or the
/// past value is zero.
pub fn try_percentage_change<S>(source: &S, days_ago: usize) -> Option<f64>
where
    S: HistorySource + ?Sized,
{
    if source.record_count() < 2 {
        return None;
    }
    let latest = source.latest()?;
    let past = source.at_offset_from_latest(days_ago)?;
    if past.net_worth == 0 {
        debug!(date = %past.date, "past net worth is zero, change undefined");
        return None;
    }
    let delta = i64::from(latest.net_worth) - i64::from(past.net_worth);
    Some(delta as f64 * 100.0 / f64::from(past.net_worth))
}

/// Like [`try_percentage_change`] but reports missing data as `0.0`.
pub fn percentage_change<S>(source: &S, days_ago: usize) -> f64
where
    S: HistorySource + ?Sized,
{
    try_percentage_change(source, days_ago).unwrap_or(0.0)
}
