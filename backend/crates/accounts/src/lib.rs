//! Accounts Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases and configuration
//! - `infra/` - PostgreSQL repository, local document storage
//! - `presentation/` - HTTP handlers, DTOs, middleware, router
//!
//! ## Features
//! - Sign up as patient or psychologist, sign in with user name + password
//! - Server-side sessions referenced by an HMAC-signed cookie
//! - At most one live session per user
//! - Temporary lockout after repeated wrong passwords
//! - Idle timeout for the protected home area
//! - Psychologist onboarding: document upload, staff verification,
//!   weekly availability
//!
//! ## Security Model
//! - Passwords hashed with Argon2id
//! - Sessions bound to client fingerprint (User-Agent)
//! - Concurrent logins rejected while the recorded session is alive

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use application::config::AccountsConfig;
pub use application::idle_timeout::IdleTimeoutPolicy;
pub use application::sweeper::SessionSweeper;
pub use error::{AccountsError, AccountsResult};
pub use infra::file_store::LocalFileStore;
pub use infra::postgres::PgAccountsRepository;
pub use presentation::router::accounts_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
