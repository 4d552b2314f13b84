//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    active_session::ActiveSession, auth_session::AuthSession, credentials::Credentials,
    profile::Profile, user::User,
};
pub use repository::AccountsRepository;
