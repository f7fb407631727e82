use serde::Serialize;

use super::records::Record;

/// An `automations` row as persisted; `trigger_config` and `actions` are
/// still serialized JSON at this layer.
#[derive(Debug, Clone, Serialize)]
pub struct AutomationRecord {
    pub automation_id: String,
    pub name: String,
    pub target_table: Option<String>,
    pub trigger_type: Option<String>,
    pub trigger_config: Option<String>,
    pub actions: Option<String>,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentRecord {
    pub agent_id: String,
    pub name: String,
    pub description: Option<String>,
    pub logic: Option<String>,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    pub status: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectStats {
    pub total: i64,
    pub avg_progress: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InnovationStats {
    pub total: i64,
    pub avg_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub workflows: Vec<StatusCount>,
    pub projects: ProjectStats,
    pub innovations: InnovationStats,
    #[serde(rename = "recentActivity")]
    pub recent_activity: Vec<Record>,
}
