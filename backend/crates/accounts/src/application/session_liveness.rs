//! Session Liveness
//!
//! Answers "does this session still exist in the store?" for the
//! single-session guard and the root resolver.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::repository::SessionRepository;

pub struct SessionLiveness<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
}

impl<S> SessionLiveness<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>) -> Self {
        Self { session_repo }
    }

    /// True iff an unexpired session with this id is stored
    ///
    /// ストアのエラーは「存在しない」として扱う。
    /// Never fails: store errors are logged and reported as not alive, and
    /// the nil id is never alive.
    ///
    /// ## Arguments
    /// * `session_id` - key of the session to look up
    pub async fn session_exists(&self, session_id: Uuid) -> bool {
        if session_id.is_nil() {
            return false;
        }

        match self.session_repo.session_exists(session_id).await {
            Ok(exists) => exists,
            Err(e) => {
                tracing::warn!(
                    session_id = %session_id,
                    error = %e,
                    "Session liveness check failed, treating session as gone"
                );
                false
            }
        }
    }
}
