use anyhow::{Context, Result, anyhow};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::core::store::types::AutomationRecord;
use crate::core::store::{Record, Table, render_id};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerType {
    Scheduled,
    RecordCreated,
    RecordUpdated,
}

impl TriggerType {
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerType::Scheduled => "scheduled",
            TriggerType::RecordCreated => "record_created",
            TriggerType::RecordUpdated => "record_updated",
        }
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "scheduled" => Ok(TriggerType::Scheduled),
            "record_created" => Ok(TriggerType::RecordCreated),
            "record_updated" => Ok(TriggerType::RecordUpdated),
            other => Err(anyhow!("unknown trigger type '{}'", other)),
        }
    }
}

/// Decoded `trigger_config` payload.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TriggerConfig {
    /// Schedule string for scheduled triggers, e.g. `"Sunday 17:00"`.
    #[serde(default)]
    pub time: Option<String>,

    /// Field-change conditions for update triggers.
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Condition {
    pub field: String,
    #[serde(default)]
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    UpdateRecord {
        fields: Record,
    },
    CreateRecord {
        target_table: Option<String>,
        fields: Option<Record>,
    },
    Log {
        message: String,
    },
    Notify {
        message: String,
    },
    CallAgent {
        agent: String,
    },
    /// A known `type` whose fields did not decode. Fails on its own when run.
    Invalid {
        kind: String,
        error: String,
    },
    /// Any `type` this version does not understand; kept so it can be reported.
    Unknown(String),
}

impl Action {
    pub fn kind(&self) -> &str {
        match self {
            Action::UpdateRecord { .. } => "update_record",
            Action::CreateRecord { .. } => "create_record",
            Action::Log { .. } => "log",
            Action::Notify { .. } => "notify",
            Action::CallAgent { .. } => "call_agent",
            Action::Invalid { kind, .. } | Action::Unknown(kind) => kind,
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum KnownAction {
    UpdateRecord {
        #[serde(default)]
        fields: Record,
    },
    CreateRecord {
        #[serde(default)]
        target_table: Option<String>,
        #[serde(default)]
        fields: Option<Record>,
    },
    Log {
        #[serde(default, deserialize_with = "message_text")]
        message: String,
    },
    Notify {
        #[serde(default, deserialize_with = "message_text")]
        message: String,
    },
    CallAgent {
        agent: String,
    },
}

/// Messages are free-form: non-string JSON is rendered as text.
fn message_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    })
}

const KNOWN_ACTIONS: &[&str] = &["update_record", "create_record", "log", "notify", "call_agent"];

impl From<KnownAction> for Action {
    fn from(action: KnownAction) -> Self {
        match action {
            KnownAction::UpdateRecord { fields } => Action::UpdateRecord { fields },
            KnownAction::CreateRecord {
                target_table,
                fields,
            } => Action::CreateRecord {
                target_table,
                fields,
            },
            KnownAction::Log { message } => Action::Log { message },
            KnownAction::Notify { message } => Action::Notify { message },
            KnownAction::CallAgent { agent } => Action::CallAgent { agent },
        }
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if KNOWN_ACTIONS.contains(&kind.as_str()) {
            Ok(match KnownAction::deserialize(value) {
                Ok(action) => action.into(),
                Err(e) => Action::Invalid {
                    kind,
                    error: e.to_string(),
                },
            })
        } else {
            Ok(Action::Unknown(kind))
        }
    }
}

/// Per-firing data handed to the action executor.
#[derive(Debug, Clone, Default)]
pub struct TriggerContext {
    pub record: Option<Record>,
    pub old_record: Option<Record>,
    pub record_id: Option<String>,
}

impl TriggerContext {
    pub fn for_record(table: Table, record: Record, old_record: Option<Record>) -> Self {
        let record_id = record.get(table.id_column()).and_then(render_id);
        Self {
            record: Some(record),
            old_record,
            record_id,
        }
    }
}

/// An automation row with its JSON payloads decoded.
#[derive(Debug, Clone)]
pub struct Automation {
    pub id: String,
    pub name: String,
    pub target_table: Table,
    pub trigger_type: TriggerType,
    pub trigger_config: TriggerConfig,
    pub actions: Vec<Action>,
}

impl Automation {
    pub fn from_record(record: &AutomationRecord) -> Result<Self> {
        let trigger_config: TriggerConfig = parse_json_or_default(record.trigger_config.as_deref())
            .context("malformed trigger_config")?;
        let actions: Vec<Action> =
            parse_json_or_default(record.actions.as_deref()).context("malformed actions")?;

        let target_table = record
            .target_table
            .as_deref()
            .ok_or_else(|| anyhow!("no target_table set"))?
            .parse::<Table>()?;
        let trigger_type = record
            .trigger_type
            .as_deref()
            .unwrap_or_default()
            .parse::<TriggerType>()?;

        Ok(Self {
            id: record.automation_id.clone(),
            name: record.name.clone(),
            target_table,
            trigger_type,
            trigger_config,
            actions,
        })
    }
}

fn parse_json_or_default<T: DeserializeOwned + Default>(raw: Option<&str>) -> Result<T> {
    match raw.map(str::trim) {
        None | Some("") => Ok(T::default()),
        Some(text) => Ok(serde_json::from_str(text)?),
    }
}
