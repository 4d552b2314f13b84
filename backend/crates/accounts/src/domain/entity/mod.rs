pub mod active_session;
pub mod auth_session;
pub mod availability_slot;
pub mod credentials;
pub mod document;
pub mod profile;
pub mod specialty;
pub mod user;
