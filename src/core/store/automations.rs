use rusqlite::{Row, params};

use super::RecordStore;
use super::error::StoreResult;
use super::types::{AgentRecord, AutomationRecord};

const AUTOMATION_COLUMNS: &str =
    "automation_id, name, target_table, trigger_type, trigger_config, actions, enabled";

fn automation_from_row(row: &Row<'_>) -> rusqlite::Result<AutomationRecord> {
    Ok(AutomationRecord {
        automation_id: row.get(0)?,
        name: row.get(1)?,
        target_table: row.get(2)?,
        trigger_type: row.get(3)?,
        trigger_config: row.get(4)?,
        actions: row.get(5)?,
        enabled: row.get::<_, Option<i64>>(6)?.unwrap_or(0) != 0,
    })
}

impl RecordStore {
    pub async fn get_enabled_automations(&self) -> StoreResult<Vec<AutomationRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(&format!(
            "SELECT {AUTOMATION_COLUMNS} FROM automations WHERE enabled = 1"
        ))?;

        let rows = stmt.query_map([], automation_from_row)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub async fn get_automation(&self, automation_id: &str) -> StoreResult<Option<AutomationRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(&format!(
            "SELECT {AUTOMATION_COLUMNS} FROM automations WHERE automation_id = ?1"
        ))?;

        let mut rows = stmt.query_map(params![automation_id], automation_from_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Enabled automations bound to `table` for the given trigger type, in
    /// storage order.
    pub async fn find_triggered_automations(
        &self,
        table: &str,
        trigger_type: &str,
    ) -> StoreResult<Vec<AutomationRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(&format!(
            "SELECT {AUTOMATION_COLUMNS} FROM automations
             WHERE target_table = ?1 AND trigger_type = ?2 AND enabled = 1
             ORDER BY rowid"
        ))?;

        let rows = stmt.query_map(params![table, trigger_type], automation_from_row)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub async fn find_enabled_agent(&self, name: &str) -> StoreResult<Option<AgentRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT agent_id, name, description, logic, enabled FROM agents
             WHERE name = ?1 AND enabled = 1 LIMIT 1",
        )?;

        let mut rows = stmt.query_map(params![name], |row| {
            Ok(AgentRecord {
                agent_id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                logic: row.get(3)?,
                enabled: row.get::<_, Option<i64>>(4)?.unwrap_or(0) != 0,
            })
        })?;

        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }
}
