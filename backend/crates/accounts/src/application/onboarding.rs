//! Psychologist Onboarding Use Case
//!
//! Psychologists pending verification see their profile and upload
//! documents for staff review. Everyone else is sent home.

use std::sync::Arc;

use crate::domain::entity::{document::Document, profile::Profile};
use crate::domain::repository::{AccountsRepository, DocumentStore};
use crate::domain::value_object::{document_type::DocumentType, ids::UserId};
use crate::error::{AccountsError, AccountsResult};

/// What the onboarding page shows
#[derive(Debug)]
pub enum OnboardingView {
    /// Not a psychologist, or already verified
    RedirectHome,
    Pending {
        profile: Profile,
        /// Newest first
        documents: Vec<Document>,
    },
}

/// Upload input
pub struct UploadDocumentInput {
    pub doc_type: DocumentType,
    pub original_name: String,
    pub bytes: Vec<u8>,
}

pub struct OnboardingUseCase<R, F>
where
    R: AccountsRepository,
    F: DocumentStore,
{
    repo: Arc<R>,
    files: Arc<F>,
}

impl<R, F> OnboardingUseCase<R, F>
where
    R: AccountsRepository,
    F: DocumentStore,
{
    pub fn new(repo: Arc<R>, files: Arc<F>) -> Self {
        Self { repo, files }
    }

    pub async fn view(&self, user_id: &UserId) -> AccountsResult<OnboardingView> {
        let Some(profile) = self.pending_profile(user_id).await? else {
            return Ok(OnboardingView::RedirectHome);
        };

        let documents = self.repo.list_user_documents(user_id).await?;
        Ok(OnboardingView::Pending { profile, documents })
    }

    /// Store the file, then record the document (not yet accepted)
    pub async fn upload(
        &self,
        user_id: &UserId,
        input: UploadDocumentInput,
    ) -> AccountsResult<Document> {
        if self.pending_profile(user_id).await?.is_none() {
            return Err(AccountsError::Forbidden(
                "Only psychologists pending verification can upload documents".to_string(),
            ));
        }

        if input.bytes.is_empty() {
            return Err(AccountsError::Validation("File is empty".to_string()));
        }

        let stored = self
            .files
            .save_document(&input.original_name, &input.bytes)
            .await?;

        let document = Document::new(
            *user_id,
            input.doc_type,
            stored.relative_path.clone(),
            input.original_name,
            stored.size_bytes,
        );

        if let Err(e) = self.repo.create_document(&document).await {
            if let Err(cleanup) = self.files.remove_document(&stored.relative_path).await {
                tracing::warn!(
                    path = %stored.relative_path,
                    error = %cleanup,
                    "Failed to remove orphaned upload"
                );
            }
            return Err(e);
        }

        tracing::info!(
            user_id = %user_id,
            document_id = %document.document_id,
            doc_type = %document.doc_type,
            size_bytes = document.size_bytes,
            "Verification document uploaded"
        );

        Ok(document)
    }

    async fn pending_profile(&self, user_id: &UserId) -> AccountsResult<Option<Profile>> {
        Ok(self
            .repo
            .find_profile(user_id)
            .await?
            .filter(Profile::needs_onboarding))
    }
}
