//! Integration tests for the daily record store

use chrono::{Duration, NaiveDate};
use networthdb::{RECORD_SIZE, RecordDate, RecordStore, UpdateMode};
use std::fs;
use tempfile::TempDir;

fn day(offset: i64) -> RecordDate {
    let start = NaiveDate::from_ymd_opt(2024, 12, 20).unwrap();
    RecordDate::from_naive(start + Duration::days(offset)).unwrap()
}

fn open_store(dir: &TempDir) -> RecordStore {
    let store = RecordStore::new(dir.path().join("networth.dat"));
    assert!(store.init());
    store
}

#[test]
fn test_upsert_same_date_never_duplicates() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);

    assert!(store.upsert(&day(0), 100));
    assert!(store.upsert(&day(1), 200));
    let count = store.record_count();

    assert!(store.upsert(&day(1), 250));
    assert_eq!(store.record_count(), count);

    let index = store.find_index(&day(1)).unwrap();
    assert_eq!(index, 1);
    assert_eq!(store.try_read_at(index).unwrap().unwrap().net_worth, 250);
}

#[test]
fn test_distinct_dates_grow_monotonically() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);

    for n in 0..40 {
        assert!(store.upsert(&day(n), n as i32));
        assert_eq!(store.record_count(), n as usize + 1);
    }
}

#[test]
fn test_history_window_matches_last_writes() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    for n in 0..10 {
        store.upsert(&day(n), 1000 + n as i32);
    }

    for k in [0usize, 1, 3, 10, 25] {
        let window = store.history_window(k);
        assert_eq!(window.len(), k.min(10));
        let expected: Vec<i32> = (10 - k.min(10)..10).map(|n| 1000 + n as i32).collect();
        let actual: Vec<i32> = window.iter().map(|r| r.net_worth).collect();
        assert_eq!(actual, expected);
    }
}

#[test]
fn test_out_of_order_resave_keeps_position() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    store.upsert(&day(0), 1);
    store.upsert(&day(1), 2);
    store.upsert(&day(2), 3);

    store.upsert(&day(0), 10);

    let dates: Vec<RecordDate> = store.history_window(3).iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![day(0), day(1), day(2)]);
    assert_eq!(store.latest().unwrap().net_worth, 3);
}

#[test]
fn test_offset_beyond_history_is_oldest() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    for n in 0..40 {
        store.upsert(&day(n), n as i32 * 3);
    }
    let count = store.record_count();
    let oldest = store.history_window(count)[0];

    for days_ago in [count - 1, count, count + 1, 365, 10_000] {
        assert_eq!(store.at_offset_from_latest(days_ago), Some(oldest));
    }
}

#[test]
fn test_latest_round_trips_exactly() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);

    for value in [0, -1, 1, i32::MIN, i32::MAX, 123_456_789] {
        let date = RecordDate::parse("09-30-2025").unwrap();
        store.upsert(&date, value);
        let latest = store.latest().unwrap();
        assert_eq!(latest.date.as_str(), "09-30-2025");
        assert_eq!(latest.net_worth, value);
    }
}

#[test]
fn test_on_disk_layout() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);
    store.upsert(&RecordDate::parse("01-02-2025").unwrap(), 1_500_000);
    store.upsert(&RecordDate::parse("01-03-2025").unwrap(), -20);

    let bytes = fs::read(store.path()).unwrap();
    assert_eq!(bytes.len(), 2 * RECORD_SIZE);
    assert_eq!(&bytes[0..10], b"01-02-2025");
    assert_eq!(bytes[10], 0);
    assert_eq!(&bytes[11..15], &1_500_000i32.to_ne_bytes());
    assert_eq!(&bytes[15..25], b"01-03-2025");
    assert_eq!(&bytes[26..30], &(-20i32).to_ne_bytes());
}

#[test]
fn test_reopen_sees_committed_records() {
    let temp_dir = TempDir::new().unwrap();
    {
        let store = open_store(&temp_dir);
        store.upsert(&day(0), 11);
        store.upsert(&day(1), 22);
    }

    let store = open_store(&temp_dir);
    assert_eq!(store.record_count(), 2);
    assert_eq!(store.latest().unwrap().net_worth, 22);
}

#[test]
fn test_update_modes_produce_identical_files() {
    let in_place_dir = TempDir::new().unwrap();
    let atomic_dir = TempDir::new().unwrap();
    let in_place = open_store(&in_place_dir);
    let atomic = RecordStore::new(atomic_dir.path().join("networth.dat"))
        .with_update_mode(UpdateMode::AtomicReplace);
    assert!(atomic.init());

    for store in [&in_place, &atomic] {
        for n in 0..5 {
            store.upsert(&day(n), n as i32);
        }
        store.upsert(&day(2), 99);
        store.upsert(&day(4), -4);
    }

    assert_eq!(
        fs::read(in_place.path()).unwrap(),
        fs::read(atomic.path()).unwrap()
    );
}
