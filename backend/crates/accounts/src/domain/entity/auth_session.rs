//! Auth Session Entity
//!
//! Server-side session referenced by the signed cookie.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::value_object::{ids::UserId, public_id::PublicId, user_role::UserRole};

#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Session ID (UUID v4), also the cookie payload
    pub session_id: Uuid,
    pub user_id: UserId,
    /// Public ID for API responses
    pub public_id: PublicId,
    /// User role at session creation
    pub user_role: UserRole,
    /// Absolute expiration (Unix timestamp ms)
    pub expires_at_ms: i64,
    /// Client fingerprint hash (User-Agent based)
    pub client_fingerprint_hash: Vec<u8>,
    /// Client IP (optional, for logging)
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Last request to the protected area; unset until the first one
    pub last_activity_at: Option<DateTime<Utc>>,
}

impl AuthSession {
    /// Create a new session; TTL comes from configuration
    pub fn new(
        user_id: UserId,
        public_id: PublicId,
        user_role: UserRole,
        fingerprint_hash: Vec<u8>,
        client_ip: Option<String>,
        user_agent: Option<String>,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            session_id: Uuid::new_v4(),
            user_id,
            public_id,
            user_role,
            expires_at_ms: (now + ttl).timestamp_millis(),
            client_fingerprint_hash: fingerprint_hash,
            client_ip,
            user_agent,
            created_at: now,
            last_activity_at: None,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() > self.expires_at_ms
    }

    /// Idle longer than `timeout` since the last recorded activity
    ///
    /// A session with no recorded activity is never idle.
    pub fn is_idle_at(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        self.last_activity_at
            .is_some_and(|last| now - last > timeout)
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> AuthSession {
        AuthSession::new(
            UserId::new(),
            PublicId::new(),
            UserRole::Patient,
            vec![0u8; 32],
            None,
            None,
            Duration::hours(12),
        )
    }

    #[test]
    fn test_expiry() {
        let s = session();
        let now = Utc::now();
        assert!(!s.is_expired_at(now));
        assert!(s.is_expired_at(now + Duration::hours(13)));
    }

    #[test]
    fn test_idle_only_after_activity() {
        let mut s = session();
        let now = Utc::now();
        let timeout = Duration::seconds(60);

        // never touched: not idle however late
        assert!(!s.is_idle_at(now + Duration::hours(1), timeout));

        s.touch(now);
        assert!(!s.is_idle_at(now + Duration::seconds(60), timeout));
        assert!(s.is_idle_at(now + Duration::seconds(61), timeout));
    }
}
