use std::sync::Arc;

use roster_db::{CredentialStore, PartnerStore};

use crate::config::ServerConfig;
use crate::session::SessionStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Durable home of the partner roster (MySQL or workbook).
    pub store: Arc<dyn PartnerStore>,
    /// Active users and their password hashes.
    pub credentials: Arc<dyn CredentialStore>,
    /// Live session contexts, keyed by token id.
    pub sessions: Arc<SessionStore>,
    pub config: Arc<ServerConfig>,
}
