pub use chrono::NaiveDateTime as DateTime;
pub use chrono::{DateTime as Timestamp, Utc};

pub type UtcTimestamp = Timestamp<Utc>;
