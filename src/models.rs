use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Category {
    Work,
    Personal,
    Shopping,
    Study,
    Other,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Personal => "personal",
            Self::Shopping => "shopping",
            Self::Study => "study",
            Self::Other => "other",
        }
    }

    /// Anything outside the fixed set, including the empty string, is `Other`.
    pub fn coerce(value: &str) -> Self {
        match value {
            "work" => Self::Work,
            "personal" => Self::Personal,
            "shopping" => Self::Shopping,
            "study" => Self::Study,
            _ => Self::Other,
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Self::coerce(&value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Anything outside the fixed set is `Low`.
    pub fn coerce(value: &str) -> Self {
        match value {
            "medium" => Self::Medium,
            "high" => Self::High,
            _ => Self::Low,
        }
    }

    /// Sort rank: high before medium before low.
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        Self::coerce(&value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Todo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Persisted envelope. The `todos` key is part of the on-disk invariant;
/// a document without it is handled by the corruption-recovery path.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TodoDocument {
    pub todos: Vec<Todo>,
}

/// Inbound create/update payload. `completed` and `progress` stay raw so the
/// validator can coerce wrong-typed input (including explicit null) instead
/// of rejecting it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodoPayload {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "value_if_present")]
    pub completed: Option<Value>,
    #[serde(default, deserialize_with = "value_if_present")]
    pub progress: Option<Value>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub description: Option<String>,
}

/// Keeps present-but-null distinguishable from absent: null deserializes to
/// `Some(Value::Null)` so the validator still sees the field.
fn value_if_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Validator output: every field typed, present only if supplied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub progress: Option<u8>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListFilters {
    pub status: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub todo_id: String,
    pub target_id: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PriorityBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CategoryBreakdown {
    pub work: usize,
    pub personal: usize,
    pub shopping: usize,
    pub study: usize,
    pub other: usize,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct TodoStats {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    pub overdue: usize,
    pub by_priority: PriorityBreakdown,
    pub by_category: CategoryBreakdown,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub data_file: PathBuf,
    pub backup_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("todos.json"),
            backup_dir: PathBuf::from("backups"),
        }
    }
}
