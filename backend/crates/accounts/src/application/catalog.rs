//! Catalog and Home Use Cases

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::entity::specialty::Specialty;
use crate::domain::repository::AccountsRepository;
use crate::domain::value_object::{ids::UserId, user_role::UserRole};
use crate::error::{AccountsError, AccountsResult};

/// Signed-in user's summary for the home page
pub struct HomeSummary {
    pub public_id: String,
    pub user_name: String,
    pub role: UserRole,
    pub is_verified: bool,
    pub is_staff: bool,
    pub last_login_at: Option<DateTime<Utc>>,
}

pub struct CatalogUseCase<R>
where
    R: AccountsRepository,
{
    repo: Arc<R>,
}

impl<R> CatalogUseCase<R>
where
    R: AccountsRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn specialties(&self) -> AccountsResult<Vec<Specialty>> {
        self.repo.list_specialties().await
    }

    pub async fn home(&self, user_id: &UserId) -> AccountsResult<HomeSummary> {
        let user = self
            .repo
            .find_user_by_id(user_id)
            .await?
            .ok_or(AccountsError::SessionInvalid)?;
        let profile = self
            .repo
            .find_profile(user_id)
            .await?
            .ok_or_else(|| AccountsError::Internal("Profile not found".to_string()))?;

        Ok(HomeSummary {
            public_id: user.public_id.to_string(),
            user_name: user.user_name.original().to_string(),
            role: profile.role,
            is_verified: profile.is_verified,
            is_staff: user.is_staff,
            last_login_at: user.last_login_at,
        })
    }
}
