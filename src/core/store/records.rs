use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, Params, params_from_iter};
use serde_json::{Map, Number, Value};

use super::RecordStore;
use super::error::{StoreError, StoreResult};
use super::tables::Table;

/// A row as it travels through the gateway: column name to JSON value.
pub type Record = Map<String, Value>;

impl RecordStore {
    pub async fn list_records(&self, table: Table) -> StoreResult<Vec<Record>> {
        let db = self.db.lock().await;
        let sql = format!("SELECT * FROM {} ORDER BY rowid DESC", table.name());
        query_records(&db, &sql, [])
    }

    pub async fn get_record(&self, table: Table, id: &str) -> StoreResult<Option<Record>> {
        let db = self.db.lock().await;
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?1",
            table.name(),
            table.id_column()
        );
        Ok(query_records(&db, &sql, [id])?.into_iter().next())
    }

    /// Inserts `data` verbatim and returns the record's id: the caller-supplied
    /// primary key when present, otherwise the SQLite rowid.
    pub async fn insert_record(&self, table: Table, data: &Record) -> StoreResult<String> {
        if data.is_empty() {
            return Err(StoreError::EmptyPayload(table.name()));
        }
        for column in data.keys() {
            table.check_column(column)?;
        }

        let columns: Vec<&str> = data.keys().map(String::as_str).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.name(),
            columns.join(", "),
            placeholders.join(", ")
        );

        let db = self.db.lock().await;
        db.execute(&sql, params_from_iter(data.values().map(to_sql_value)))?;

        Ok(data
            .get(table.id_column())
            .and_then(render_id)
            .unwrap_or_else(|| db.last_insert_rowid().to_string()))
    }

    /// Sets each column in `data` on the row keyed by `id`. Returns the number
    /// of rows changed.
    pub async fn update_record(&self, table: Table, id: &str, data: &Record) -> StoreResult<usize> {
        if data.is_empty() {
            return Err(StoreError::EmptyPayload(table.name()));
        }
        for column in data.keys() {
            table.check_column(column)?;
        }

        let assignments: Vec<String> = data
            .keys()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", column, i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?{}",
            table.name(),
            assignments.join(", "),
            table.id_column(),
            data.len() + 1
        );

        let mut values: Vec<SqlValue> = data.values().map(to_sql_value).collect();
        values.push(SqlValue::Text(id.to_string()));

        let db = self.db.lock().await;
        Ok(db.execute(&sql, params_from_iter(values))?)
    }

    pub async fn delete_record(&self, table: Table, id: &str) -> StoreResult<usize> {
        let db = self.db.lock().await;
        let sql = format!("DELETE FROM {} WHERE {} = ?1", table.name(), table.id_column());
        Ok(db.execute(&sql, [id])?)
    }
}

/// Renders a primary-key value the way it appears in URLs and the activity log.
pub fn render_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(super) fn query_records<P: Params>(
    db: &Connection,
    sql: &str,
    params: P,
) -> StoreResult<Vec<Record>> {
    let mut stmt = db.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

    let mut rows = stmt.query(params)?;
    let mut results = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Record::new();
        for (i, column) in columns.iter().enumerate() {
            record.insert(column.clone(), from_sql_value(row.get_ref(i)?));
        }
        results.push(record);
    }
    Ok(results)
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(*b as i64),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        // Nested JSON is stored as its serialized text.
        other => SqlValue::Text(other.to_string()),
    }
}

fn from_sql_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(t) | ValueRef::Blob(t) => {
            Value::String(String::from_utf8_lossy(t).into_owned())
        }
    }
}
