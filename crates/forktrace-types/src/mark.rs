use serde::{Deserialize, Serialize};

/// A pushdown checkpoint: a later `rewind` truncates the conversation back
/// to this point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    pub message_id: i64,
    pub label: Option<String>,
}
