//! Request extractors.
//!
//! - [`auth::AuthSession`] -- resolves the Bearer token to a live session.

pub mod auth;
