use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use sqlx::FromRow;

/// One catalog row as column name to value, in the order the server returned
/// the columns.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Per-table mapping, ordered like the table list it was built from.
pub type TableMap<T> = IndexMap<String, Vec<T>>;

#[derive(FromRow, Serialize, Debug, Clone, PartialEq, Eq)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CheckConstraint {
    pub constraint_name: String,
    pub check_clause: String,
}

#[derive(FromRow, Serialize, Debug, Clone, PartialEq, Eq)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ForeignKey {
    pub table_name: String,
    pub column_name: String,
    pub constraint_name: String,
    pub referenced_table_name: String,
    pub referenced_column_name: String,
}

#[derive(FromRow, Serialize, Debug, Clone, PartialEq, Eq)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Routine {
    pub routine_name: String,
}

#[derive(FromRow, Serialize, Debug, Clone, PartialEq, Eq)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Trigger {
    pub trigger_name: String,
    pub event_object_table: String,
    /// INSERT, UPDATE or DELETE.
    pub event_manipulation: String,
    /// BEFORE or AFTER.
    pub action_timing: String,
    pub action_statement: String,
}

/// An `INFORMATION_SCHEMA.EVENTS` row as fetched, timestamps still typed.
#[derive(FromRow, Debug, Clone, PartialEq, Eq)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct EventRow {
    pub event_name: String,
    pub last_executed: Option<chrono::NaiveDateTime>,
    pub event_type: String,
    pub execute_at: Option<chrono::NaiveDateTime>,
    pub interval_value: Option<String>,
    pub interval_field: Option<String>,
    pub status: String,
}

/// An event as it appears in the document. Timestamps are text so the
/// document stays plain JSON.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Event {
    pub event_name: String,
    pub last_executed: String,
    pub event_type: String,
    pub execute_at: String,
    pub interval_value: Option<String>,
    pub interval_field: Option<String>,
    pub status: String,
}

/// Rendered in place of a timestamp the server reports as NULL.
pub const MISSING_TIMESTAMP: &str = "None";

fn timestamp_text(ts: Option<chrono::NaiveDateTime>) -> String {
    match ts {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => MISSING_TIMESTAMP.to_string(),
    }
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            event_name: row.event_name,
            last_executed: timestamp_text(row.last_executed),
            event_type: row.event_type,
            execute_at: timestamp_text(row.execute_at),
            interval_value: row.interval_value,
            interval_field: row.interval_field,
            status: row.status,
        }
    }
}

/// Everything extracted for one schema.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct SchemaSection {
    #[serde(rename = "Tables")]
    pub tables: TableMap<Record>,
    #[serde(rename = "indices")]
    pub indices: TableMap<Record>,
    #[serde(rename = "Events")]
    pub events: Vec<Event>,
    #[serde(rename = "Triggers")]
    pub triggers: Vec<Trigger>,
    #[serde(rename = "Procedures")]
    pub procedures: Vec<Routine>,
    #[serde(rename = "Functions")]
    pub functions: Vec<Routine>,
    #[serde(rename = "Foreign_Keys")]
    pub foreign_keys: TableMap<ForeignKey>,
    #[serde(rename = "Checks")]
    pub checks: TableMap<CheckConstraint>,
}

/// The extraction result: `{"Host": ..., "<schema>": {...}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    pub host: String,
    pub schema: String,
    pub section: SchemaSection,
}

impl Serialize for SchemaDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("Host", &self.host)?;
        map.serialize_entry(&self.schema, &self.section)?;
        map.end()
    }
}
