//! Fixed-width daily record file.
//!
//! The file is a headerless sequence of [`RECORD_SIZE`]-byte records in write
//! order. Every operation opens its own handle, performs one seek and one
//! read or write, and drops the handle before returning.

use crate::core::{DATE_KEY_LEN, DailyRecord, RECORD_SIZE, RecordDate, Result, StoreError};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

// ============================================================================
// Update Mode
// ============================================================================

/// How an existing record is rewritten when its date is saved again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// Overwrite the record's 15-byte range directly.
    #[default]
    InPlace,
    /// Rewrite the whole file into a temp file and rename it over the original.
    AtomicReplace,
}

// ============================================================================
// Results
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted { index: usize },
    Updated { index: usize },
}

impl UpsertOutcome {
    pub fn index(&self) -> usize {
        match self {
            Self::Inserted { index } | Self::Updated { index } => *index,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreStats {
    pub file_bytes: u64,
    pub record_count: usize,
    /// Bytes past the last whole record. Non-zero only after an interrupted append.
    pub trailing_bytes: u64,
}

impl StoreStats {
    fn from_len(file_bytes: u64) -> Self {
        let record_size = RECORD_SIZE as u64;
        Self {
            file_bytes,
            record_count: (file_bytes / record_size) as usize,
            trailing_bytes: file_bytes % record_size,
        }
    }
}

// ============================================================================
// Record Store
// ============================================================================

pub struct RecordStore {
    path: PathBuf,
    update_mode: UpdateMode,
}

impl RecordStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            update_mode: UpdateMode::default(),
        }
    }

    pub fn with_update_mode(mut self, mode: UpdateMode) -> Self {
        self.update_mode = mode;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn update_mode(&self) -> UpdateMode {
        self.update_mode
    }

    // ------------------------------------------------------------------------
    // Mount
    // ------------------------------------------------------------------------

    /// Prepares the backing directory and file.
    ///
    /// Returns `false` when the medium cannot be prepared. Callers keep
    /// running on cached values in that case; later operations fail the same
    /// way and are absorbed the same way.
    pub fn init(&self) -> bool {
        match self.try_init() {
            Ok(stats) => {
                info!(
                    path = %self.path.display(),
                    records = stats.record_count,
                    bytes = stats.file_bytes,
                    "record store mounted"
                );
                true
            }
            Err(err) => {
                error!(path = %self.path.display(), error = %err, "record store mount failed");
                false
            }
        }
    }

    pub fn try_init(&self) -> Result<StoreStats> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                StoreError::NotMounted(format!("{}: {}", parent.display(), e))
            })?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::NotMounted(format!("{}: {}", self.path.display(), e)))?;
        self.try_stats()
    }

    // ------------------------------------------------------------------------
    // Size
    // ------------------------------------------------------------------------

    pub fn stats(&self) -> StoreStats {
        self.try_stats().unwrap_or_default()
    }

    pub fn try_stats(&self) -> Result<StoreStats> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(StoreStats::from_len(meta.len())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StoreStats::default()),
            Err(e) => Err(StoreError::io("Failed to stat record store", e)),
        }
    }

    /// Number of whole records; 0 when the file is missing or unreadable.
    pub fn record_count(&self) -> usize {
        self.stats().record_count
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    /// Position of the record keyed by `date`, scanning from the start.
    pub fn find_index(&self, date: &RecordDate) -> Option<usize> {
        self.try_find_index(date).unwrap_or_else(|err| {
            warn!(date = %date, error = %err, "date lookup failed");
            None
        })
    }

    pub fn try_find_index(&self, date: &RecordDate) -> Result<Option<usize>> {
        let Some(file) = self.open_read()? else {
            return Ok(None);
        };
        let mut reader = BufReader::new(file);
        let mut buf = [0u8; RECORD_SIZE];
        let mut index = 0;
        loop {
            match reader.read_exact(&mut buf) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
                Err(e) => return Err(StoreError::io("Failed to scan record store", e)),
            }
            if &buf[..DATE_KEY_LEN] == date.key_bytes() {
                return Ok(Some(index));
            }
            index += 1;
        }
    }

    /// Reads the record at `index`, or `None` when it lies past the last whole record.
    pub fn try_read_at(&self, index: usize) -> Result<Option<DailyRecord>> {
        let Some(mut file) = self.open_read()? else {
            return Ok(None);
        };
        let len = file
            .metadata()
            .map_err(|e| StoreError::io("Failed to stat record store", e))?
            .len();
        if index >= StoreStats::from_len(len).record_count {
            return Ok(None);
        }
        file.seek(SeekFrom::Start((index * RECORD_SIZE) as u64))
            .map_err(|e| StoreError::io("Failed to seek record store", e))?;
        let mut buf = [0u8; RECORD_SIZE];
        file.read_exact(&mut buf).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => StoreError::ShortRead { index },
            _ => StoreError::io("Failed to read record", e),
        })?;
        DailyRecord::decode(&buf, index).map(Some)
    }

    fn read_at(&self, index: usize) -> Option<DailyRecord> {
        self.try_read_at(index).unwrap_or_else(|err| {
            warn!(index, error = %err, "record read failed");
            None
        })
    }

    /// The last whole record in the file.
    pub fn latest(&self) -> Option<DailyRecord> {
        let count = self.record_count();
        if count == 0 {
            return None;
        }
        self.read_at(count - 1)
    }

    /// The record `days_ago` positions before the latest one.
    ///
    /// Requests reaching past the start of history resolve to the oldest
    /// record instead of failing.
    pub fn at_offset_from_latest(&self, days_ago: usize) -> Option<DailyRecord> {
        let count = self.record_count();
        if count == 0 {
            return None;
        }
        self.read_at((count - 1).saturating_sub(days_ago))
    }

    /// Up to `max_days` most recent records, oldest first.
    pub fn history_window(&self, max_days: usize) -> Vec<DailyRecord> {
        self.try_history_window(max_days).unwrap_or_else(|err| {
            warn!(max_days, error = %err, "history read failed");
            Vec::new()
        })
    }

    pub fn try_history_window(&self, max_days: usize) -> Result<Vec<DailyRecord>> {
        let Some(mut file) = self.open_read()? else {
            return Ok(Vec::new());
        };
        let len = file
            .metadata()
            .map_err(|e| StoreError::io("Failed to stat record store", e))?
            .len();
        let total = StoreStats::from_len(len).record_count;
        let to_read = max_days.min(total);
        if to_read == 0 {
            return Ok(Vec::new());
        }
        let start = total - to_read;

        file.seek(SeekFrom::Start((start * RECORD_SIZE) as u64))
            .map_err(|e| StoreError::io("Failed to seek record store", e))?;
        let mut data = Vec::with_capacity(to_read * RECORD_SIZE);
        file.take((to_read * RECORD_SIZE) as u64)
            .read_to_end(&mut data)
            .map_err(|e| StoreError::io("Failed to read history", e))?;

        let mut records = Vec::with_capacity(to_read);
        for (offset, chunk) in data.chunks_exact(RECORD_SIZE).enumerate() {
            let mut buf = [0u8; RECORD_SIZE];
            buf.copy_from_slice(chunk);
            match DailyRecord::decode(&buf, start + offset) {
                Ok(record) => records.push(record),
                Err(err) => warn!(error = %err, "skipping unreadable record in history"),
            }
        }
        Ok(records)
    }

    // ------------------------------------------------------------------------
    // Write
    // ------------------------------------------------------------------------

    /// Saves `net_worth` for `date`, replacing the value if the date already exists.
    pub fn upsert(&self, date: &RecordDate, net_worth: i32) -> bool {
        match self.try_upsert(date, net_worth) {
            Ok(UpsertOutcome::Inserted { index }) => {
                info!(date = %date, net_worth, index, "saved net worth");
                true
            }
            Ok(UpsertOutcome::Updated { index }) => {
                info!(date = %date, net_worth, index, "updated net worth");
                true
            }
            Err(err) => {
                error!(date = %date, net_worth, error = %err, "failed to save net worth");
                false
            }
        }
    }

    pub fn try_upsert(&self, date: &RecordDate, net_worth: i32) -> Result<UpsertOutcome> {
        let record = DailyRecord::new(*date, net_worth);
        match self.try_find_index(date)? {
            Some(index) => {
                match self.update_mode {
                    UpdateMode::InPlace => self.overwrite_in_place(index, &record)?,
                    UpdateMode::AtomicReplace => self.overwrite_atomic(index, &record)?,
                }
                Ok(UpsertOutcome::Updated { index })
            }
            None => self.append(&record).map(|index| UpsertOutcome::Inserted { index }),
        }
    }

    fn overwrite_in_place(&self, index: usize, record: &DailyRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .map_err(|e| StoreError::io("Failed to open record store for update", e))?;
        file.seek(SeekFrom::Start((index * RECORD_SIZE) as u64))
            .map_err(|e| StoreError::io("Failed to seek record store", e))?;
        write_record(&mut file, &record.encode())?;
        file.sync_data()
            .map_err(|e| StoreError::io("Failed to sync record store", e))
    }

    fn overwrite_atomic(&self, index: usize, record: &DailyRecord) -> Result<()> {
        let mut data = fs::read(&self.path)
            .map_err(|e| StoreError::io("Failed to read record store for update", e))?;
        let start = index * RECORD_SIZE;
        let Some(slot) = data.get_mut(start..start + RECORD_SIZE) else {
            return Err(StoreError::ShortRead { index });
        };
        slot.copy_from_slice(&record.encode());

        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent.to_path_buf(),
            None => PathBuf::from("."),
        };
        let mut temp = tempfile::NamedTempFile::new_in(&dir)
            .map_err(|e| StoreError::io("Failed to create temp file", e))?;
        temp.write_all(&data)
            .map_err(|e| StoreError::io("Failed to write temp file", e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| StoreError::io("Failed to sync temp file", e))?;
        temp.persist(&self.path)
            .map_err(|e| StoreError::io("Failed to replace record store", e.error))?;
        Ok(())
    }

    fn append(&self, record: &DailyRecord) -> Result<usize> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&self.path)
            .map_err(|e| StoreError::io("Failed to open record store for append", e))?;
        let len = file
            .metadata()
            .map_err(|e| StoreError::io("Failed to stat record store", e))?
            .len();
        let stats = StoreStats::from_len(len);
        let aligned = (stats.record_count * RECORD_SIZE) as u64;
        if stats.trailing_bytes > 0 {
            warn!(
                trailing_bytes = stats.trailing_bytes,
                "discarding partial record at end of store"
            );
            file.set_len(aligned)
                .map_err(|e| StoreError::io("Failed to truncate partial record", e))?;
        }
        file.seek(SeekFrom::Start(aligned))
            .map_err(|e| StoreError::io("Failed to seek record store", e))?;
        write_record(&mut file, &record.encode())?;
        file.sync_data()
            .map_err(|e| StoreError::io("Failed to sync record store", e))?;
        Ok(stats.record_count)
    }

    fn open_read(&self) -> Result<Option<File>> {
        match File::open(&self.path) {
            Ok(file) => Ok(Some(file)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io("Failed to open record store", e)),
        }
    }
}

/// Writes one encoded record, reporting how far it got if the medium stops accepting bytes.
fn write_record<W: Write>(writer: &mut W, buf: &[u8; RECORD_SIZE]) -> Result<()> {
    let mut written = 0;
    while written < RECORD_SIZE {
        match writer.write(&buf[written..]) {
            Ok(0) => break,
            Ok(n) => written += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!(written, error = %e, "record write aborted");
                break;
            }
        }
    }
    if written != RECORD_SIZE {
        return Err(StoreError::ShortWrite {
            expected: RECORD_SIZE,
            written,
        });
    }
    writer
        .flush()
        .map_err(|e| StoreError::io("Failed to flush record", e))
}
