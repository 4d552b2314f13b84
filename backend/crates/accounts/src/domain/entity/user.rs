//! User Entity
//!
//! Identity and sign-in handle. Credentials and the professional profile
//! live in their own entities.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    email::Email, ids::UserId, public_id::PublicId, user_name::UserName,
};

#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier
    pub user_id: UserId,
    /// Public-facing nanoid identifier (URL-safe)
    pub public_id: PublicId,
    /// User name (unique on its canonical form)
    pub user_name: UserName,
    pub email: Option<Email>,
    /// Staff may review documents and manage the specialty catalog
    pub is_staff: bool,
    /// Last successful login time
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(user_name: UserName, email: Option<Email>) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            public_id: PublicId::new(),
            user_name,
            email,
            is_staff: false,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record successful login
    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.last_login_at = Some(now);
        self.updated_at = now;
    }
}
