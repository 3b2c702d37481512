use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Identity record. The `session_id` is the opaque token carried in the
/// session cookie and is the sole credential.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }
}

impl Default for User {
    fn default() -> Self {
        Self::new()
    }
}
