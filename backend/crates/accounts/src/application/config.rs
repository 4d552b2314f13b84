//! Application Configuration
//!
//! Configuration for the accounts application layer.

use std::path::PathBuf;
use std::time::Duration;

use platform::cookie::CookieConfig;

use crate::application::idle_timeout::IdleTimeoutPolicy;
use crate::domain::entity::credentials::LockoutPolicy;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Accounts application configuration
#[derive(Debug, Clone)]
pub struct AccountsConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// Session secret key for HMAC signing (32 bytes)
    pub session_secret: [u8; 32],
    /// Absolute session lifetime (12 hours)
    pub session_ttl: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Idle timeout for the protected area
    pub idle: IdleTimeoutPolicy,
    /// Failed-login lockout
    pub lockout: LockoutPolicy,
    /// Root directory for uploaded documents
    pub media_root: PathBuf,
    /// Largest accepted document upload in bytes
    pub max_upload_bytes: usize,
    /// Interval of the expired/stale session sweep
    pub sweep_interval: Duration,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "accounts_session".to_string(),
            session_secret: [0u8; 32],
            session_ttl: Duration::from_secs(12 * 3600), // 12 hours
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
            idle: IdleTimeoutPolicy::default(),
            lockout: LockoutPolicy::default(),
            media_root: PathBuf::from("./media"),
            max_upload_bytes: 10 * 1024 * 1024, // 10 MiB
            sweep_interval: Duration::from_secs(300),
        }
    }
}

impl AccountsConfig {
    /// Create config with a random session secret
    pub fn with_random_secret() -> Self {
        Self {
            session_secret: platform::crypto::random_secret(),
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Session TTL as a chrono duration
    pub fn session_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.session_ttl).unwrap_or(chrono::Duration::hours(12))
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    /// Cookie attributes for the session cookie
    pub fn session_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.session_ttl.as_secs()),
        }
    }
}
