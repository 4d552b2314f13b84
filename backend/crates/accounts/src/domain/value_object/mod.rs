//! Value Object Module

pub mod document_type;
pub mod email;
pub mod ids;
pub mod public_id;
pub mod user_name;
pub mod user_password;
pub mod user_role;
