/// Row store row ids are 1-based, assigned on append, never reused.
pub type RowId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
