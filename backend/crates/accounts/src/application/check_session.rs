//! Check Session Use Case
//!
//! Verifies and retrieves session information.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AccountsConfig;
use crate::application::session_token;
use crate::domain::entity::auth_session::AuthSession;
use crate::domain::repository::SessionRepository;
use crate::error::{AccountsError, AccountsResult};

/// Session info output
#[derive(Debug)]
pub struct SessionInfoOutput {
    pub public_id: String,
    pub user_role: String,
    pub expires_at_ms: i64,
}

/// Check session use case
pub struct CheckSessionUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
    config: Arc<AccountsConfig>,
}

impl<S> CheckSessionUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AccountsConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    /// Check if session is valid and return session info
    pub async fn execute(
        &self,
        session_token: &str,
        fingerprint_hash: &[u8],
    ) -> AccountsResult<SessionInfoOutput> {
        let session = self.get_session(session_token, fingerprint_hash).await?;

        Ok(SessionInfoOutput {
            public_id: session.public_id.to_string(),
            user_role: session.user_role.code().to_string(),
            expires_at_ms: session.expires_at_ms,
        })
    }

    /// Resolve the cookie token to a live session bound to this client
    ///
    /// Does not record activity; only the idle-timeout layer does that.
    pub async fn get_session(
        &self,
        session_token: &str,
        fingerprint_hash: &[u8],
    ) -> AccountsResult<AuthSession> {
        let session_id = session_token::parse(&self.config, session_token)?;

        let session = self
            .session_repo
            .find_session(session_id, fingerprint_hash)
            .await?
            .ok_or(AccountsError::SessionInvalid)?;

        if session.is_expired_at(Utc::now()) {
            self.session_repo.delete_session(session_id).await?;
            return Err(AccountsError::SessionInvalid);
        }

        Ok(session)
    }
}
