//! Single Active Session Guard
//!
//! Keeps at most one live session per user. The recorded session blocks a
//! new login until it is gone; the caller's own previous session never
//! blocks and is rotated out.
//!
//! `ensure_no_other_session` is the early check that spares a doomed login
//! the session insert. The rule itself is enforced by `establish`, which
//! claims the user's slot in one atomic repository call.

use std::sync::Arc;

use uuid::Uuid;

use crate::application::session_liveness::SessionLiveness;
use crate::domain::entity::{active_session::ActiveSession, auth_session::AuthSession};
use crate::domain::repository::{ActiveSessionRepository, SessionRepository};
use crate::domain::value_object::ids::UserId;
use crate::error::{AccountsError, AccountsResult};

pub struct SingleSessionGuard<R>
where
    R: SessionRepository + ActiveSessionRepository,
{
    repo: Arc<R>,
    liveness: SessionLiveness<R>,
}

impl<R> SingleSessionGuard<R>
where
    R: SessionRepository + ActiveSessionRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            liveness: SessionLiveness::new(repo.clone()),
            repo,
        }
    }

    /// Reject the login when another live session is recorded for the user
    ///
    /// `current_session` is the session the request already carries, if any.
    pub async fn ensure_no_other_session(
        &self,
        user_id: &UserId,
        current_session: Option<Uuid>,
    ) -> AccountsResult<()> {
        let Some(active) = self.repo.find_active_session(user_id).await? else {
            return Ok(());
        };

        if Some(active.session_id) == current_session {
            return Ok(());
        }

        if self.liveness.session_exists(active.session_id).await {
            tracing::warn!(
                user_id = %user_id,
                session_id = %active.session_id,
                "Login rejected: another session is active"
            );
            return Err(AccountsError::ActiveSessionElsewhere);
        }

        Ok(())
    }

    /// 新しいセッションを保存し、ユーザーの唯一の有効セッションとして登録する
    ///
    /// Stores `session` and claims the user's active slot for it. When a
    /// concurrent login claimed the slot first, the new session is deleted
    /// again and the login is rejected. On success the caller's previous
    /// session is deleted.
    ///
    /// ## Arguments
    /// * `session` - freshly created session for the user
    /// * `previous_session` - session id from the caller's cookie, if any
    ///
    /// ## Errors
    /// * `ActiveSessionElsewhere` - another live session holds the slot
    pub async fn establish(
        &self,
        session: &AuthSession,
        previous_session: Option<Uuid>,
    ) -> AccountsResult<()> {
        self.repo.create_session(session).await?;

        let active = ActiveSession::new(session.user_id, session.session_id);
        if !self
            .repo
            .claim_active_session(&active, previous_session)
            .await?
        {
            self.repo.delete_session(session.session_id).await?;
            tracing::warn!(
                user_id = %session.user_id,
                "Login rejected: a concurrent login claimed the session slot"
            );
            return Err(AccountsError::ActiveSessionElsewhere);
        }

        if let Some(previous) = previous_session.filter(|id| *id != session.session_id) {
            self.repo.delete_session(previous).await?;
        }

        Ok(())
    }

    /// Forget the user's active record and delete the session
    pub async fn release(&self, user_id: &UserId, session_id: Uuid) -> AccountsResult<()> {
        self.repo.delete_active_session(user_id).await?;
        self.repo.delete_session(session_id).await
    }
}
