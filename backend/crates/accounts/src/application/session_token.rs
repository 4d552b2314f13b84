//! Session cookie tokens: `"<session uuid>.<base64url(HMAC-SHA256)>"`

use platform::crypto::{sign_token, verify_token};
use uuid::Uuid;

use crate::application::config::AccountsConfig;
use crate::error::{AccountsError, AccountsResult};

/// Sign a session id for the cookie
pub fn issue(config: &AccountsConfig, session_id: Uuid) -> String {
    sign_token(&config.session_secret, &session_id.to_string())
}

/// Verify the signature and extract the session id
pub fn parse(config: &AccountsConfig, token: &str) -> AccountsResult<Uuid> {
    let payload =
        verify_token(&config.session_secret, token).ok_or(AccountsError::SessionInvalid)?;
    payload.parse().map_err(|_| AccountsError::SessionInvalid)
}
