//! Sign Out Use Case
//!
//! Invalidates the caller's session and its active-session record.

use std::sync::Arc;

use crate::application::config::AccountsConfig;
use crate::application::session_guard::SingleSessionGuard;
use crate::application::session_token;
use crate::domain::repository::{ActiveSessionRepository, SessionRepository};
use crate::error::AccountsResult;

/// Sign out use case
pub struct SignOutUseCase<R>
where
    R: SessionRepository + ActiveSessionRepository,
{
    repo: Arc<R>,
    guard: SingleSessionGuard<R>,
    config: Arc<AccountsConfig>,
}

impl<R> SignOutUseCase<R>
where
    R: SessionRepository + ActiveSessionRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AccountsConfig>) -> Self {
        Self {
            guard: SingleSessionGuard::new(repo.clone()),
            repo,
            config,
        }
    }

    /// Sign out from the current session; a missing session is not an error
    pub async fn execute(&self, session_token: &str, fingerprint_hash: &[u8]) -> AccountsResult<()> {
        let session_id = session_token::parse(&self.config, session_token)?;

        match self.repo.find_session(session_id, fingerprint_hash).await? {
            Some(session) => {
                self.guard.release(&session.user_id, session_id).await?;
                tracing::info!(
                    public_id = %session.public_id,
                    session_id = %session_id,
                    "User signed out"
                );
            }
            None => {
                self.repo.delete_session(session_id).await?;
            }
        }

        Ok(())
    }
}
