/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar date of an appointment (shop-local, no timezone).
pub type Date = chrono::NaiveDate;

/// Wall-clock time of an appointment (shop-local, no timezone).
pub type Time = chrono::NaiveTime;
