use chrono::{DateTime, Utc};
use common::AuditLogId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What kind of mutation an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Insert,
    Update,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Insert => "INSERT",
            AuditAction::Update => "UPDATE",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One immutable row of the audit trail.
///
/// `old_values` is always `None` for `Insert` entries. Either side may be
/// `None` after a serialization failure — audit capture degrades instead
/// of blocking the primary write. Entries are append-only: nothing in
/// this core updates or deletes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Assigned by the log store on append.
    pub id: Option<AuditLogId>,

    /// Logical aggregate name, e.g. `"appointments"`.
    pub table_name: String,

    /// Surrogate id of the mutated record.
    pub record_id: i64,

    /// Mutation kind.
    pub action: AuditAction,

    /// Snapshot taken before the mutation, if any.
    pub old_values: Option<Value>,

    /// State after the mutation.
    pub new_values: Option<Value>,

    /// Resolved principal name, or the `"system"` sentinel. Never empty.
    pub actor: String,

    /// When the entry was recorded.
    pub changed_at: DateTime<Utc>,
}
