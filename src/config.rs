use crate::core::{Result, StoreError};
use crate::storage::UpdateMode;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_FILE: &str = "networth.dat";
pub const DEFAULT_STATE_FILE: &str = "state.bin";

/// Tracker configuration
///
/// Every field has a default, so a JSON config file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Directory holding the record store and state file
    pub data_dir: PathBuf,

    /// Record store file name inside `data_dir`
    pub db_file: String,

    /// Cached state file name inside `data_dir`
    pub state_file: String,

    /// Net worth goal for the time-to-goal projection
    pub goal: Option<i32>,

    /// Name shown in the dashboard title
    pub owner_name: Option<String>,

    /// How many days the sparkline covers
    pub sparkline_days: usize,

    /// Fewest points worth drawing a sparkline for
    pub sparkline_min_points: usize,

    /// Lookback for the headline percentage change
    pub change_days: usize,

    /// How repeat saves of a date are written
    pub update_mode: UpdateMode,
}

impl TrackerConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            db_file: DEFAULT_DB_FILE.to_string(),
            state_file: DEFAULT_STATE_FILE.to_string(),
            goal: None,
            owner_name: None,
            sparkline_days: 30,
            sparkline_min_points: 7,
            change_days: 1,
            update_mode: UpdateMode::InPlace,
        }
    }

    pub fn goal(mut self, goal: i32) -> Self {
        self.goal = Some(goal);
        self
    }

    pub fn owner_name(mut self, name: &str) -> Self {
        self.owner_name = Some(name.to_string());
        self
    }

    pub fn sparkline_days(mut self, days: usize) -> Self {
        self.sparkline_days = days;
        self
    }

    pub fn sparkline_min_points(mut self, points: usize) -> Self {
        self.sparkline_min_points = points;
        self
    }

    pub fn change_days(mut self, days: usize) -> Self {
        self.change_days = days;
        self
    }

    pub fn update_mode(mut self, mode: UpdateMode) -> Self {
        self.update_mode = mode;
        self
    }

    /// Reads a JSON config file. Missing keys keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            StoreError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            StoreError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join(&self.state_file)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.db_file.is_empty() {
            return Err(StoreError::Config("db_file cannot be empty".to_string()));
        }

        if self.state_file.is_empty() {
            return Err(StoreError::Config("state_file cannot be empty".to_string()));
        }

        if self.db_file == self.state_file {
            return Err(StoreError::Config(
                "db_file and state_file must differ".to_string(),
            ));
        }

        if self.change_days == 0 {
            return Err(StoreError::Config("change_days must be > 0".to_string()));
        }

        if self.sparkline_min_points > self.sparkline_days {
            return Err(StoreError::Config(
                "sparkline_min_points cannot exceed sparkline_days".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new("networthdb_data")
    }
}
