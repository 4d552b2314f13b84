//! Sign Up Use Case
//!
//! Creates a patient or psychologist account and signs the new user in.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::application::config::AccountsConfig;
use crate::application::session_guard::SingleSessionGuard;
use crate::application::session_token;
use crate::domain::entity::{
    auth_session::AuthSession, credentials::Credentials, profile::Profile, user::User,
};
use crate::domain::repository::{AccountsRepository, NewAccount};
use crate::domain::value_object::{
    email::Email,
    ids::SpecialtyId,
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
    user_role::UserRole,
};
use crate::error::{AccountsError, AccountsResult};
use platform::client::ClientFingerprint;

const PHONE_MAX_LENGTH: usize = 20;
const LICENSE_MAX_LENGTH: usize = 150;

/// Sign up input
pub struct SignUpInput {
    pub user_name: String,
    pub email: Option<String>,
    pub password: String,
    pub password_confirmation: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub license_number: Option<String>,
    pub specialty_ids: Vec<String>,
}

/// Sign up output
pub struct SignUpOutput {
    /// Session token for cookie
    pub session_token: String,
    pub public_id: String,
    pub role: String,
    pub redirect: String,
}

impl fmt::Debug for SignUpOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpOutput")
            .field("session_token", &"[REDACTED]")
            .field("public_id", &self.public_id)
            .field("role", &self.role)
            .field("redirect", &self.redirect)
            .finish()
    }
}

/// Sign up use case
pub struct SignUpUseCase<R>
where
    R: AccountsRepository,
{
    repo: Arc<R>,
    guard: SingleSessionGuard<R>,
    config: Arc<AccountsConfig>,
}

impl<R> SignUpUseCase<R>
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

    pub async fn execute(
        &self,
        input: SignUpInput,
        fingerprint: ClientFingerprint,
        current_session: Option<Uuid>,
    ) -> AccountsResult<SignUpOutput> {
        let user_name =
            UserName::new(&input.user_name).map_err(|e| AccountsError::Validation(e.to_string()))?;
        let email = Email::parse_optional(input.email)?;

        if input.password != input.password_confirmation {
            return Err(AccountsError::PasswordMismatch);
        }
        let raw_password = RawPassword::new(input.password)?;

        let phone = optional_text(input.phone, "Phone", PHONE_MAX_LENGTH)?;
        let (license_number, specialty_ids) = match input.role {
            UserRole::Psychologist => (
                optional_text(input.license_number, "License number", LICENSE_MAX_LENGTH)?,
                self.resolve_specialties(&input.specialty_ids).await?,
            ),
            UserRole::Patient => (None, Vec::new()),
        };

        if self.repo.user_name_exists(&user_name).await? {
            return Err(AccountsError::UserNameTaken);
        }
        if let Some(email) = &email {
            if self.repo.email_exists(email).await? {
                return Err(AccountsError::EmailTaken);
            }
        }

        let password_hash = UserPassword::from_raw(&raw_password, self.config.pepper())?;

        let user = User::new(user_name, email);
        let mut profile = Profile::new(user.user_id, input.role);
        profile.phone = phone;
        profile.license_number = license_number;
        profile.specialty_ids = specialty_ids;

        let account = NewAccount {
            credentials: Credentials::new(user.user_id, password_hash),
            profile,
            user,
        };
        self.repo.create_account(&account).await?;

        let NewAccount { user, profile, .. } = account;

        // Sign the new user in
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
        self.repo.record_login(&user.user_id, Utc::now()).await?;

        tracing::info!(
            public_id = %user.public_id,
            role = %profile.role,
            "User signed up"
        );

        Ok(SignUpOutput {
            session_token: session_token::issue(&self.config, session.session_id),
            public_id: user.public_id.to_string(),
            role: profile.role.code().to_string(),
            redirect: profile.landing().as_str().to_string(),
        })
    }

    /// Parse, dedupe and check that every specialty exists
    async fn resolve_specialties(&self, raw_ids: &[String]) -> AccountsResult<Vec<SpecialtyId>> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for raw in raw_ids {
            let uuid: Uuid = raw
                .trim()
                .parse()
                .map_err(|_| AccountsError::Validation(format!("Invalid specialty id: {raw}")))?;
            if seen.insert(uuid) {
                ids.push(SpecialtyId::from_uuid(uuid));
            }
        }

        if !ids.is_empty() && self.repo.count_specialties(&ids).await? != ids.len() {
            return Err(AccountsError::Validation(
                "One or more specialties do not exist".to_string(),
            ));
        }

        Ok(ids)
    }
}

/// Trim optional free text; blank becomes `None`
fn optional_text(
    value: Option<String>,
    field: &str,
    max_length: usize,
) -> AccountsResult<Option<String>> {
    let Some(value) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if value.chars().count() > max_length {
        return Err(AccountsError::Validation(format!(
            "{field} must be at most {max_length} characters"
        )));
    }

    Ok(Some(value))
}
