use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid table name: {0}")]
    UnknownTable(String),

    #[error("Unknown column '{column}' for table {table}")]
    UnknownColumn { table: &'static str, column: String },

    #[error("Record payload for {0} has no columns")]
    EmptyPayload(&'static str),

    #[error("Record not found")]
    NotFound,

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// True for errors caused by the caller's input rather than the database.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StoreError::UnknownTable(_)
                | StoreError::UnknownColumn { .. }
                | StoreError::EmptyPayload(_)
        )
    }
}
