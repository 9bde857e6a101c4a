// ============================================================================
// NetWorthDB Library
// ============================================================================

pub mod analytics;
pub mod config;
pub mod core;
pub mod cycle;
pub mod state;
pub mod storage;

// Re-export main types for convenience
pub use analytics::{AnalyticsEngine, Projection, ProjectionModel};
pub use config::TrackerConfig;
pub use crate::core::{DailyRecord, RECORD_SIZE, RecordDate, Result, StoreError};
pub use cycle::{CycleInput, Dashboard, WakeCycle};
pub use state::CachedState;
pub use storage::{HistorySource, RecordStore, StateFile, UpdateMode, UpsertOutcome};

// ============================================================================
// High-level Tracker API
// ============================================================================

/// Net worth tracker: one record store plus the analytics over it.
///
/// This is the recommended entry point for the surrounding firmware or CLI.
///
/// # Examples
///
/// ```
/// use networthdb::{RecordDate, Tracker, TrackerConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let dir = tempfile::TempDir::new()?;
/// let tracker = Tracker::open(TrackerConfig::new(dir.path()));
/// assert!(tracker.is_mounted());
///
/// tracker.upsert(&RecordDate::parse("06-01-2025")?, 1000);
/// tracker.upsert(&RecordDate::parse("06-02-2025")?, 1050);
///
/// assert_eq!(tracker.percentage_change(1), 5.0);
/// # Ok(())
/// # }
/// ```
pub struct Tracker {
    config: TrackerConfig,
    store: RecordStore,
    mounted: bool,
}

impl Tracker {
    /// Opens the record store described by `config`.
    ///
    /// A failed mount is not fatal: the tracker still answers every call,
    /// with failed writes and empty reads.
    pub fn open(config: TrackerConfig) -> Self {
        let store = RecordStore::new(config.db_path()).with_update_mode(config.update_mode);
        let mounted = store.init();
        Self {
            config,
            store,
            mounted,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn analytics(&self) -> AnalyticsEngine<'_, RecordStore> {
        AnalyticsEngine::new(&self.store)
    }

    pub fn upsert(&self, date: &RecordDate, net_worth: i32) -> bool {
        self.store.upsert(date, net_worth)
    }

    pub fn latest(&self) -> Option<DailyRecord> {
        self.store.latest()
    }

    pub fn history_window(&self, max_days: usize) -> Vec<DailyRecord> {
        self.store.history_window(max_days)
    }

    pub fn percentage_change(&self, days_ago: usize) -> f64 {
        self.analytics().percentage_change(days_ago)
    }

    pub fn goal_projection(&self, goal: i32) -> String {
        self.analytics().goal_projection(goal)
    }

    pub fn state_file(&self) -> StateFile {
        StateFile::new(self.config.state_path())
    }

    /// Runs one wake cycle against this tracker's store.
    pub fn run_cycle(&self, state: &mut CachedState, today: &RecordDate, input: &CycleInput) -> Dashboard {
        WakeCycle::new(&self.config, &self.store).run(state, today, input)
    }
}
