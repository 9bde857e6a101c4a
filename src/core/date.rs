use super::{Result, StoreError};
use chrono::{Datelike, Local, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Number of significant characters in a date key (`MM-DD-YYYY`).
pub const DATE_KEY_LEN: usize = 10;

/// On-disk width of the date field: the key plus a NUL terminator.
pub const DATE_FIELD_LEN: usize = DATE_KEY_LEN + 1;

const DATE_FORMAT: &str = "%m-%d-%Y";

/// Calendar-day key of a [`DailyRecord`](super::DailyRecord).
///
/// Always holds exactly ten ASCII bytes in `MM-DD-YYYY` form with zero-padded
/// month and day and a four-digit year. Construction validates the calendar
/// date, so `02-30-2024` and the unsynchronised-clock placeholder
/// `00-00-0000` are both rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordDate {
    key: [u8; DATE_KEY_LEN],
}

impl RecordDate {
    pub fn parse(input: &str) -> Result<Self> {
        let bytes = input.as_bytes();
        let well_formed = bytes.len() == DATE_KEY_LEN
            && bytes.iter().enumerate().all(|(i, b)| match i {
                2 | 5 => *b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !well_formed {
            return Err(StoreError::InvalidDate(input.to_string()));
        }
        let date = NaiveDate::parse_from_str(input, DATE_FORMAT)
            .map_err(|_| StoreError::InvalidDate(input.to_string()))?;
        Self::from_naive(date)
    }

    pub fn from_naive(date: NaiveDate) -> Result<Self> {
        if !(0..=9999).contains(&date.year()) {
            return Err(StoreError::InvalidDate(date.to_string()));
        }
        let text = date.format(DATE_FORMAT).to_string();
        let mut key = [0u8; DATE_KEY_LEN];
        key.copy_from_slice(text.as_bytes());
        Ok(Self { key })
    }

    /// Today's date on the local clock.
    pub fn today() -> Self {
        let today = Local::now().date_naive();
        // Local clock years are always four digits in practice.
        Self::from_naive(today).unwrap_or(Self {
            key: *b"01-01-1970",
        })
    }

    /// Decodes the fixed-width on-disk field. The terminator byte is ignored.
    pub(crate) fn from_field(field: &[u8]) -> Result<Self> {
        let key = field.get(..DATE_KEY_LEN).ok_or_else(|| {
            StoreError::InvalidDate(String::from_utf8_lossy(field).into_owned())
        })?;
        let text = std::str::from_utf8(key)
            .map_err(|_| StoreError::InvalidDate(String::from_utf8_lossy(key).into_owned()))?;
        Self::parse(text)
    }

    pub(crate) fn to_field(self) -> [u8; DATE_FIELD_LEN] {
        let mut field = [0u8; DATE_FIELD_LEN];
        field[..DATE_KEY_LEN].copy_from_slice(&self.key);
        field
    }

    pub fn key_bytes(&self) -> &[u8; DATE_KEY_LEN] {
        &self.key
    }

    pub fn as_str(&self) -> &str {
        // Only ever built from validated ASCII.
        std::str::from_utf8(&self.key).unwrap_or("00-00-0000")
    }

    pub fn to_naive(self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.as_str(), DATE_FORMAT).ok()
    }
}

impl FromStr for RecordDate {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for RecordDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_date() {
        let date = RecordDate::parse("03-07-2025").unwrap();
        assert_eq!(date.as_str(), "03-07-2025");
        assert_eq!(date.to_naive(), NaiveDate::from_ymd_opt(2025, 3, 7));
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        for input in ["3-07-2025", "2025-03-07", "03/07/2025", "03-07-25", "", "03-07-2025x"] {
            assert!(RecordDate::parse(input).is_err(), "accepted {input}");
        }
    }

    #[test]
    fn test_parse_rejects_impossible_dates() {
        assert!(RecordDate::parse("02-30-2024").is_err());
        assert!(RecordDate::parse("13-01-2024").is_err());
        assert!(RecordDate::parse("00-00-0000").is_err());
    }

    #[test]
    fn test_field_round_trip() {
        let date = RecordDate::parse("12-31-1999").unwrap();
        let field = date.to_field();
        assert_eq!(field[DATE_KEY_LEN], 0);
        assert_eq!(RecordDate::from_field(&field).unwrap(), date);
    }

    #[test]
    fn test_from_naive_zero_pads() {
        let date = RecordDate::from_naive(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()).unwrap();
        assert_eq!(date.to_string(), "01-05-2024");
    }
}
