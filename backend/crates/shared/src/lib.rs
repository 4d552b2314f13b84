//! Shared Kernel
//!
//! Vocabulary every backend crate agrees on:
//! - the unified [`error::app_error::AppError`] and its [`error::kind::ErrorKind`]
//! - typed identifiers ([`id::Id`])
//!
//! Anything domain-specific belongs in the domain crates, not here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
