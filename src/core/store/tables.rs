use std::fmt;
use std::str::FromStr;

use super::error::StoreError;

/// The closed set of tables exposed through the record gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    WorkflowNavigator,
    PortfolioSync,
    InnovationFlow,
    BackendInsight,
    DreamJournal,
    ScrobbleHistory,
    XavierLore,
    HealthMetrics,
    MoneyMoves,
    SystemConfig,
    Automations,
    Agents,
    ActivityLog,
}

impl Table {
    pub const ALL: [Table; 13] = [
        Table::WorkflowNavigator,
        Table::PortfolioSync,
        Table::InnovationFlow,
        Table::BackendInsight,
        Table::DreamJournal,
        Table::ScrobbleHistory,
        Table::XavierLore,
        Table::HealthMetrics,
        Table::MoneyMoves,
        Table::SystemConfig,
        Table::Automations,
        Table::Agents,
        Table::ActivityLog,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Table::WorkflowNavigator => "workflow_navigator",
            Table::PortfolioSync => "portfolio_sync",
            Table::InnovationFlow => "innovation_flow",
            Table::BackendInsight => "backend_insight",
            Table::DreamJournal => "dream_journal",
            Table::ScrobbleHistory => "scrobble_history",
            Table::XavierLore => "xavier_lore",
            Table::HealthMetrics => "health_metrics",
            Table::MoneyMoves => "money_moves",
            Table::SystemConfig => "system_config",
            Table::Automations => "automations",
            Table::Agents => "agents",
            Table::ActivityLog => "activity_log",
        }
    }

    pub fn id_column(self) -> &'static str {
        match self {
            Table::WorkflowNavigator => "workflow_id",
            Table::PortfolioSync => "project_id",
            Table::InnovationFlow => "opportunity_id",
            Table::BackendInsight => "insight_id",
            Table::DreamJournal => "dream_id",
            Table::ScrobbleHistory => "scrobble_id",
            Table::XavierLore => "lore_id",
            Table::HealthMetrics => "metric_id",
            Table::MoneyMoves => "transaction_id",
            Table::SystemConfig => "config_key",
            Table::Automations => "automation_id",
            Table::Agents => "agent_id",
            Table::ActivityLog => "log_id",
        }
    }

    /// Every column of the table, primary key first.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Table::WorkflowNavigator => &[
                "workflow_id",
                "name",
                "description",
                "status",
                "priority",
                "assigned_to",
                "last_updated",
                "deadline",
            ],
            Table::PortfolioSync => &[
                "project_id",
                "project_name",
                "owner",
                "progress",
                "sync_status",
                "last_sync",
                "review_date",
            ],
            Table::InnovationFlow => &[
                "opportunity_id",
                "title",
                "description",
                "trend_score",
                "category",
                "impact",
                "owner",
                "review_status",
            ],
            Table::BackendInsight => &[
                "insight_id",
                "title",
                "description",
                "category",
                "priority",
                "created_at",
                "status",
            ],
            Table::DreamJournal => &[
                "dream_id",
                "date",
                "title",
                "description",
                "symbols",
                "sentiment",
                "interpretation",
                "created_at",
            ],
            Table::ScrobbleHistory => &[
                "scrobble_id",
                "timestamp",
                "track_name",
                "artist",
                "album",
                "duration",
                "source",
            ],
            Table::XavierLore => &[
                "lore_id",
                "title",
                "content",
                "category",
                "tags",
                "created_at",
                "updated_at",
            ],
            Table::HealthMetrics => &[
                "metric_id",
                "date",
                "metric_type",
                "value",
                "unit",
                "notes",
                "source",
                "created_at",
            ],
            Table::MoneyMoves => &[
                "transaction_id",
                "date",
                "type",
                "amount",
                "category",
                "description",
                "status",
                "created_at",
            ],
            Table::SystemConfig => &["config_key", "config_value", "description", "updated_at"],
            Table::Automations => &[
                "automation_id",
                "name",
                "target_table",
                "trigger_type",
                "trigger_config",
                "actions",
                "enabled",
                "created_at",
            ],
            Table::Agents => &[
                "agent_id",
                "name",
                "description",
                "logic",
                "enabled",
                "created_at",
            ],
            Table::ActivityLog => &[
                "log_id",
                "timestamp",
                "action",
                "table_name",
                "record_id",
                "user",
                "details",
            ],
        }
    }

    pub fn has_column(self, column: &str) -> bool {
        self.columns().contains(&column)
    }

    /// Rejects any column name the table does not declare. Column names are
    /// interpolated into SQL, so nothing reaches a statement unchecked.
    pub fn check_column(self, column: &str) -> Result<(), StoreError> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(StoreError::UnknownColumn {
                table: self.name(),
                column: column.to_string(),
            })
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| StoreError::UnknownTable(s.to_string()))
    }
}
