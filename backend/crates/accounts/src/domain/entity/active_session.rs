//! Active Session Entity
//!
//! The one session key currently recorded for a user. A second login is
//! rejected while this session is still alive.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::value_object::ids::UserId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub user_id: UserId,
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl ActiveSession {
    pub fn new(user_id: UserId, session_id: Uuid) -> Self {
        Self {
            user_id,
            session_id,
            created_at: Utc::now(),
        }
    }
}
