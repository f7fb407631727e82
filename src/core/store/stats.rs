use super::RecordStore;
use super::error::StoreResult;
use super::activity::recent_activity;
use super::types::{DashboardStats, InnovationStats, ProjectStats, StatusCount};

impl RecordStore {
    pub async fn dashboard_stats(&self) -> StoreResult<DashboardStats> {
        let db = self.db.lock().await;

        let mut stmt = db.prepare(
            "SELECT status, COUNT(*) AS count FROM workflow_navigator GROUP BY status",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(StatusCount {
                status: row.get(0)?,
                count: row.get(1)?,
            })
        })?;
        let mut workflows = Vec::new();
        for row in rows {
            workflows.push(row?);
        }

        let projects = db.query_row(
            "SELECT COUNT(*), AVG(progress) FROM portfolio_sync",
            [],
            |row| {
                Ok(ProjectStats {
                    total: row.get(0)?,
                    avg_progress: row.get(1)?,
                })
            },
        )?;

        let innovations = db.query_row(
            "SELECT COUNT(*), AVG(trend_score) FROM innovation_flow",
            [],
            |row| {
                Ok(InnovationStats {
                    total: row.get(0)?,
                    avg_score: row.get(1)?,
                })
            },
        )?;

        let recent_activity = recent_activity(&db, 10)?;

        Ok(DashboardStats {
            workflows,
            projects,
            innovations,
            recent_activity,
        })
    }
}
