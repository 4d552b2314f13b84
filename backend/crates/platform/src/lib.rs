//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no domain knowledge:
//! - Client identification (User-Agent fingerprint, client IP)
//! - Cookie building and parsing
//! - Cryptographic helpers (SHA-256, HMAC-signed tokens)
//! - Password policy and Argon2id hashing

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod password;
