//! Idle Timeout
//!
//! Sessions that go quiet for longer than the configured timeout are
//! invalidated the next time they reach the protected area. Activity is only
//! recorded on protected paths, so browsing elsewhere does not keep a
//! session warm.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::application::session_guard::SingleSessionGuard;
use crate::domain::entity::auth_session::AuthSession;
use crate::domain::repository::{ActiveSessionRepository, SessionRepository};
use crate::error::AccountsResult;

/// Which paths count as the protected area, and how long a session may idle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdleTimeoutPolicy {
    pub timeout: Duration,
    pub protected_prefixes: Vec<String>,
    pub exempt_exact: Vec<String>,
    pub exempt_prefixes: Vec<String>,
}

impl Default for IdleTimeoutPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            protected_prefixes: vec!["/api/home".to_string()],
            exempt_exact: vec![
                "/api/accounts/login".to_string(),
                "/api/accounts/logout".to_string(),
                "/api/accounts/signup".to_string(),
            ],
            exempt_prefixes: vec!["/static/".to_string(), "/api/admin/".to_string()],
        }
    }
}

impl IdleTimeoutPolicy {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }

    pub fn timeout_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.timeout).unwrap_or(chrono::Duration::MAX)
    }

    /// Whether the idle check runs for this request path
    ///
    /// Paths compare with a trailing slash, so `/api/home` and `/api/home/`
    /// are the same and `/api/homework` is not under `/api/home`.
    pub fn applies_to(&self, path: &str) -> bool {
        let path = with_trailing_slash(path);

        if self
            .exempt_exact
            .iter()
            .any(|exempt| with_trailing_slash(exempt) == path)
        {
            return false;
        }

        if self
            .exempt_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        {
            return false;
        }

        self.protected_prefixes
            .iter()
            .any(|prefix| path.starts_with(with_trailing_slash(prefix).as_str()))
    }
}

fn with_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

/// Outcome of the idle check for one session
#[derive(Debug)]
pub enum IdleVerdict {
    /// Activity recorded, request may proceed
    Active(AuthSession),
    /// Session and active record removed
    Expired,
}

/// Where the root entry point sends the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootTarget {
    Home,
    Login,
}

impl RootTarget {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RootTarget::Home => "home",
            RootTarget::Login => "login",
        }
    }
}

pub struct IdleTimeoutUseCase<R>
where
    R: SessionRepository + ActiveSessionRepository,
{
    repo: Arc<R>,
    guard: SingleSessionGuard<R>,
    policy: IdleTimeoutPolicy,
}

impl<R> IdleTimeoutUseCase<R>
where
    R: SessionRepository + ActiveSessionRepository,
{
    pub fn new(repo: Arc<R>, policy: IdleTimeoutPolicy) -> Self {
        Self {
            guard: SingleSessionGuard::new(repo.clone()),
            repo,
            policy,
        }
    }

    /// アイドル状態のセッションを無効化し、それ以外は最終アクセスを更新する
    ///
    /// ## Arguments
    /// * `session` - session already resolved from the cookie
    /// * `now` - request time, written as the new `last_activity_at`
    ///
    /// ## Returns
    /// * `IdleVerdict::Expired` - session and active record were deleted
    /// * `IdleVerdict::Active` - the touched session
    pub async fn enforce(
        &self,
        mut session: AuthSession,
        now: DateTime<Utc>,
    ) -> AccountsResult<IdleVerdict> {
        if session.is_idle_at(now, self.policy.timeout_chrono()) {
            self.guard
                .release(&session.user_id, session.session_id)
                .await?;

            tracing::info!(
                public_id = %session.public_id,
                session_id = %session.session_id,
                "Session expired due to inactivity"
            );
            return Ok(IdleVerdict::Expired);
        }

        self.repo.touch_session(session.session_id, now).await?;
        session.touch(now);
        Ok(IdleVerdict::Active(session))
    }

    /// Decide the landing of the root entry point
    ///
    /// Unlike [`enforce`](Self::enforce) this never records activity.
    pub async fn resolve_root(
        &self,
        session: Option<AuthSession>,
        now: DateTime<Utc>,
    ) -> AccountsResult<RootTarget> {
        let Some(session) = session else {
            return Ok(RootTarget::Login);
        };

        if !session.is_idle_at(now, self.policy.timeout_chrono()) {
            return Ok(RootTarget::Home);
        }

        self.guard
            .release(&session.user_id, session.session_id)
            .await?;
        Ok(RootTarget::Login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_paths() {
        let policy = IdleTimeoutPolicy::default();
        assert!(policy.applies_to("/api/home"));
        assert!(policy.applies_to("/api/home/"));
        assert!(policy.applies_to("/api/home/summary"));
        assert!(!policy.applies_to("/api/homework"));
        assert!(!policy.applies_to("/api/specialties"));
    }

    #[test]
    fn test_exempt_paths() {
        let mut policy = IdleTimeoutPolicy::default();
        policy.protected_prefixes = vec!["/".to_string()];

        assert!(!policy.applies_to("/api/accounts/login"));
        assert!(!policy.applies_to("/api/accounts/login/"));
        assert!(!policy.applies_to("/api/accounts/signup"));
        assert!(!policy.applies_to("/static/app.css"));
        assert!(!policy.applies_to("/api/admin/documents"));
        // exact exemption does not cover sub-paths
        assert!(policy.applies_to("/api/accounts/login/extra"));
        assert!(policy.applies_to("/api/psych/onboarding"));
    }

    #[test]
    fn test_with_timeout() {
        let policy = IdleTimeoutPolicy::with_timeout(Duration::from_secs(900));
        assert_eq!(policy.timeout_chrono(), chrono::Duration::seconds(900));
        assert_eq!(policy.protected_prefixes, vec!["/api/home".to_string()]);
    }
}
