//! Staff Verification Use Case
//!
//! Staff review uploaded documents; accepting a document verifies the
//! owning psychologist. Staff also maintain the specialty catalog.

use std::sync::Arc;

use crate::domain::entity::{document::DocumentWithOwner, specialty::Specialty};
use crate::domain::repository::AccountsRepository;
use crate::domain::value_object::ids::{DocumentId, UserId};
use crate::error::{AccountsError, AccountsResult};

const SPECIALTY_NAME_MAX_LENGTH: usize = 100;

/// Result of accepting documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptOutput {
    pub accepted: u64,
    pub profiles_verified: u64,
}

pub struct VerificationUseCase<R>
where
    R: AccountsRepository,
{
    repo: Arc<R>,
}

impl<R> VerificationUseCase<R>
where
    R: AccountsRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Fail with 403 unless the user is staff
    pub async fn require_staff(&self, user_id: &UserId) -> AccountsResult<()> {
        let user = self
            .repo
            .find_user_by_id(user_id)
            .await?
            .ok_or(AccountsError::SessionInvalid)?;

        if !user.is_staff {
            tracing::warn!(public_id = %user.public_id, "Staff-only endpoint denied");
            return Err(AccountsError::Forbidden("Staff access required".to_string()));
        }

        Ok(())
    }

    pub async fn list_documents(
        &self,
        accepted: Option<bool>,
    ) -> AccountsResult<Vec<DocumentWithOwner>> {
        self.repo.list_documents(accepted).await
    }

    pub async fn accept_documents(&self, raw_ids: &[String]) -> AccountsResult<AcceptOutput> {
        if raw_ids.is_empty() {
            return Err(AccountsError::Validation(
                "documentIds must not be empty".to_string(),
            ));
        }

        let mut ids = Vec::with_capacity(raw_ids.len());
        for raw in raw_ids {
            let uuid = raw
                .trim()
                .parse()
                .map_err(|_| AccountsError::Validation(format!("Invalid document id: {raw}")))?;
            let id = DocumentId::from_uuid(uuid);
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        let (accepted, profiles_verified) = self.repo.accept_documents(&ids).await?;

        tracing::info!(
            accepted = accepted,
            profiles_verified = profiles_verified,
            "Documents accepted"
        );

        Ok(AcceptOutput {
            accepted,
            profiles_verified,
        })
    }

    pub async fn create_specialty(&self, name: &str) -> AccountsResult<Specialty> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AccountsError::Validation(
                "Specialty name cannot be empty".to_string(),
            ));
        }
        if name.chars().count() > SPECIALTY_NAME_MAX_LENGTH {
            return Err(AccountsError::Validation(format!(
                "Specialty name must be at most {SPECIALTY_NAME_MAX_LENGTH} characters"
            )));
        }

        if self.repo.specialty_name_exists(name).await? {
            return Err(AccountsError::SpecialtyTaken);
        }

        let specialty = Specialty::new(name.to_string());
        self.repo.create_specialty(&specialty).await?;

        tracing::info!(specialty_id = %specialty.specialty_id, name = %specialty.name, "Specialty created");
        Ok(specialty)
    }
}
