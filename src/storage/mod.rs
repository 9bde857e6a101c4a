pub mod engine;
pub mod persistence;
pub mod record_store;

pub use engine::HistorySource;
pub use persistence::{StateFile, StateSnapshot};
pub use record_store::{RecordStore, StoreStats, UpdateMode, UpsertOutcome};
