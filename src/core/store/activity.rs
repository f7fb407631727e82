use rusqlite::{Connection, params};

use super::RecordStore;
use super::error::StoreResult;
use super::records::{Record, query_records};

impl RecordStore {
    /// Appends one entry to the activity log and returns its `log_id`.
    pub async fn log_activity(
        &self,
        action: &str,
        table: &str,
        record_id: &str,
        details: &str,
    ) -> StoreResult<i64> {
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO activity_log (action, table_name, record_id, details) VALUES (?1, ?2, ?3, ?4)",
            params![action, table, record_id, details],
        )?;
        Ok(db.last_insert_rowid())
    }

}

/// Newest activity first; entries logged in the same second keep insert order.
pub(super) fn recent_activity(db: &Connection, limit: u32) -> StoreResult<Vec<Record>> {
    query_records(
        db,
        "SELECT * FROM activity_log ORDER BY timestamp DESC, log_id DESC LIMIT ?1",
        [limit],
    )
}
