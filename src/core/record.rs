use super::date::{DATE_FIELD_LEN, RecordDate};
use super::{Result, StoreError};

/// Size in bytes of one encoded record: date field plus a 4-byte net worth.
pub const RECORD_SIZE: usize = DATE_FIELD_LEN + std::mem::size_of::<i32>();

/// One day of tracked net worth, in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyRecord {
    pub date: RecordDate,
    pub net_worth: i32,
}

impl DailyRecord {
    pub fn new(date: RecordDate, net_worth: i32) -> Self {
        Self { date, net_worth }
    }

    /// Encodes the record into its fixed on-disk layout.
    ///
    /// The net worth is stored in native byte order so files stay readable
    /// by the device that wrote them.
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        buf[..DATE_FIELD_LEN].copy_from_slice(&self.date.to_field());
        buf[DATE_FIELD_LEN..].copy_from_slice(&self.net_worth.to_ne_bytes());
        buf
    }

    pub fn decode(buf: &[u8; RECORD_SIZE], index: usize) -> Result<Self> {
        let date = RecordDate::from_field(&buf[..DATE_FIELD_LEN]).map_err(|e| {
            StoreError::CorruptRecord {
                index,
                reason: e.to_string(),
            }
        })?;
        let mut value = [0u8; 4];
        value.copy_from_slice(&buf[DATE_FIELD_LEN..]);
        Ok(Self {
            date,
            net_worth: i32::from_ne_bytes(value),
        })
    }
}
