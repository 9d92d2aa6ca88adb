use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One engine run; at most one session per engine instance is active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub started_at: DateTime<Utc>,
    /// `None` means active.
    pub ended_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }
}
