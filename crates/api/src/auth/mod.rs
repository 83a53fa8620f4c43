//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- access tokens that carry the session id.

pub mod jwt;
pub mod password;
