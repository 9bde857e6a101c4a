pub mod date;
pub mod error;
pub mod record;

pub use date::{DATE_FIELD_LEN, DATE_KEY_LEN, RecordDate};
pub use error::{Result, StoreError};
pub use record::{DailyRecord, RECORD_SIZE};
