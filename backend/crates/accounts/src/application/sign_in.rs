//! Sign In Use Case
//!
//! Authenticates a user and creates a session, applying the login lockout
//! and the single-active-session rule.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::application::config::AccountsConfig;
use crate::application::session_guard::SingleSessionGuard;
use crate::application::session_token;
use crate::domain::entity::auth_session::AuthSession;
use crate::domain::entity::credentials::FailureOutcome;
use crate::domain::entity::profile::Landing;
use crate::domain::repository::AccountsRepository;
use crate::domain::value_object::{user_name::UserName, user_password::RawPassword};
use crate::error::{AccountsError, AccountsResult};

/// Re-export ClientFingerprint from platform
pub use platform::client::ClientFingerprint;

/// Sign in input
pub struct SignInInput {
    pub user_name: String,
    pub password: String,
    /// Where to go after sign-in; only local paths are honored
    pub next: Option<String>,
}

/// Sign in output
pub struct SignInOutput {
    /// Session token for cookie
    pub session_token: String,
    pub public_id: String,
    pub role: String,
    pub redirect: String,
}

impl fmt::Debug for SignInOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInOutput")
            .field("session_token", &"[REDACTED]")
            .field("public_id", &self.public_id)
            .field("role", &self.role)
            .field("redirect", &self.redirect)
            .finish()
    }
}

/// Sign in use case
pub struct SignInUseCase<R>
where
    R: AccountsRepository,
{
    repo: Arc<R>,
    guard: SingleSessionGuard<R>,
    config: Arc<AccountsConfig>,
}

impl<R> SignInUseCase<R>
where
    R: AccountsRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AccountsConfig>) -> Self {
        Self {
            guard: SingleSessionGuard::new(repo.clone()),
            repo,
            config,
        }
    }

    /// `current_session` is the session id from the caller's cookie, if any
    pub async fn execute(
        &self,
        input: SignInInput,
        fingerprint: ClientFingerprint,
        current_session: Option<Uuid>,
    ) -> AccountsResult<SignInOutput> {
        let canonical = UserName::canonicalize(&input.user_name);
        if canonical.is_empty() {
            return Err(AccountsError::InvalidCredentials);
        }

        // Unknown user names are not tracked
        let user = self
            .repo
            .find_user_by_user_name(&canonical)
            .await?
            .ok_or(AccountsError::InvalidCredentials)?;

        let credentials = self
            .repo
            .find_credentials(&user.user_id)
            .await?
            .ok_or_else(|| AccountsError::Internal("Credentials not found".to_string()))?;

        let now = Utc::now();
        if let Some(remaining_minutes) = credentials.remaining_lockout_minutes(now) {
            return Err(AccountsError::AccountLocked { remaining_minutes });
        }

        let raw_password = RawPassword::for_verification(input.password);
        if !credentials
            .password_hash
            .verify(&raw_password, self.config.pepper())
        {
            let policy = self.config.lockout;
            let recorded = self
                .repo
                .record_failed_login(&user.user_id, &policy, now)
                .await?;

            return Err(match policy.outcome(recorded.failed_attempts) {
                FailureOutcome::Remaining(remaining_attempts) => {
                    AccountsError::WrongPassword { remaining_attempts }
                }
                FailureOutcome::LockedOut => {
                    tracing::warn!(public_id = %user.public_id, "Account locked after failed logins");
                    AccountsError::LockoutTriggered {
                        max_failures: policy.max_failures,
                        lockout_minutes: policy.lockout_minutes(),
                    }
                }
            });
        }

        if credentials.failed_attempts > 0 || credentials.lockout_until.is_some() {
            self.repo.clear_failed_logins(&user.user_id, now).await?;
        }

        self.guard
            .ensure_no_other_session(&user.user_id, current_session)
            .await?;

        let profile = self
            .repo
            .find_profile(&user.user_id)
            .await?
            .ok_or_else(|| AccountsError::Internal("Profile not found".to_string()))?;

        let session = AuthSession::new(
            user.user_id,
            user.public_id,
            profile.role,
            fingerprint.hash_vec(),
            fingerprint.ip_string(),
            fingerprint.user_agent.clone(),
            self.config.session_ttl_chrono(),
        );
        self.guard.establish(&session, current_session).await?;
        self.repo.record_login(&user.user_id, now).await?;

        let redirect = match profile.landing() {
            Landing::PsychOnboarding => Landing::PsychOnboarding.as_str().to_string(),
            Landing::Home => safe_next(input.next.as_deref())
                .unwrap_or(Landing::Home.as_str())
                .to_string(),
        };

        tracing::info!(
            public_id = %user.public_id,
            session_id = %session.session_id,
            "User signed in"
        );

        Ok(SignInOutput {
            session_token: session_token::issue(&self.config, session.session_id),
            public_id: user.public_id.to_string(),
            role: profile.role.code().to_string(),
            redirect,
        })
    }
}

/// Accept `next` only when it is a local absolute path
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.map(str::trim).filter(|next| {
        next.starts_with('/')
            && !next.starts_with("//")
            && !next.contains('\\')
            && !next.chars().any(char::is_control)
    })
}
