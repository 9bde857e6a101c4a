use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid date '{0}': expected MM-DD-YYYY")]
    InvalidDate(String),

    #[error("Storage medium not mounted: {0}")]
    NotMounted(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Short write: expected {expected} bytes, wrote {written}")]
    ShortWrite { expected: usize, written: usize },

    #[error("Short read at record {index}")]
    ShortRead { index: usize },

    #[error("Corrupt record at index {index}: {reason}")]
    CorruptRecord { index: usize, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("State file error: {0}")]
    State(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Wraps an I/O error with a short description of what was being attempted.
    pub fn io(action: &str, err: std::io::Error) -> Self {
        Self::Io(format!("{}: {}", action, err))
    }
}
