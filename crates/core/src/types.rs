/// Frames, photos and log entries are keyed by UUIDs (v7, so they sort by creation time).
pub type RecordId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a new time-ordered record id.
pub fn new_record_id() -> RecordId {
    uuid::Uuid::now_v7()
}
