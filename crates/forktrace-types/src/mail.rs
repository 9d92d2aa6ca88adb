use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum body length accepted by the mailbox.
pub const MAIL_BODY_MAX_LEN: usize = 4096;

/// An inter-agent message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mail {
    pub id: i64,
    pub session_id: i64,
    pub from_uuid: Uuid,
    pub to_uuid: Uuid,
    pub body: String,
    /// Unix timestamp (seconds), matching the persisted `int8` column.
    pub timestamp: i64,
    pub read: bool,
}
