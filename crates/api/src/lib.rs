//! Partner roster API server library.
//!
//! Exposes config, state, sessions, error handling and routes so integration
//! tests and the binary entrypoints can share them.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod session;
pub mod state;
