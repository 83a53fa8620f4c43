//! Collaborator traits the API talks to, and their MySQL implementations.
//!
//! [`PartnerStore`] holds partner records; [`CredentialStore`] looks up
//! password hashes for active users. Both are object-safe so the server can
//! pick a backend at start-up and hold it as `Arc<dyn ...>`.

use std::collections::HashMap;

use async_trait::async_trait;
use roster_core::partner::PartnerRecord;

use crate::error::StoreError;
use crate::repositories::{PartnerRepo, UserRepo};
use crate::DbPool;

// ---------------------------------------------------------------------------
// Partner store
// ---------------------------------------------------------------------------

/// Durable home of the partner roster.
#[async_trait]
pub trait PartnerStore: Send + Sync {
    /// Short backend name for logs and the health endpoint.
    fn backend(&self) -> &'static str;

    /// Full collection, in insertion order.
    async fn list(&self) -> Result<Vec<PartnerRecord>, StoreError>;

    /// Append one record.
    async fn insert(&self, record: &PartnerRecord) -> Result<(), StoreError>;

    /// Append a confirmed import batch, all-or-nothing. Returns the number of
    /// records written.
    async fn insert_batch(&self, records: &[PartnerRecord]) -> Result<u64, StoreError>;

    /// Whether the backend is currently usable.
    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Partner store over the `parceiros_jwm` MySQL table.
#[derive(Clone)]
pub struct MySqlPartnerStore {
    pool: DbPool,
}

impl MySqlPartnerStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PartnerStore for MySqlPartnerStore {
    fn backend(&self) -> &'static str {
        "mysql"
    }

    async fn list(&self) -> Result<Vec<PartnerRecord>, StoreError> {
        let records = PartnerRepo::list_all(&self.pool)
            .await
            .map_err(StoreError::from_read)?;
        tracing::debug!(count = records.len(), "Loaded partner records");
        Ok(records)
    }

    async fn insert(&self, record: &PartnerRecord) -> Result<(), StoreError> {
        PartnerRepo::insert(&self.pool, record)
            .await
            .map_err(StoreError::from_write)?;
        tracing::info!(plate = %record.plate, "Partner record inserted");
        Ok(())
    }

    async fn insert_batch(&self, records: &[PartnerRecord]) -> Result<u64, StoreError> {
        let inserted = PartnerRepo::insert_batch(&self.pool, records)
            .await
            .map_err(StoreError::from_write)?;
        tracing::info!(inserted, "Partner import batch committed");
        Ok(inserted)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool)
            .await
            .map_err(StoreError::from_read)
    }
}

// ---------------------------------------------------------------------------
// Credential store
// ---------------------------------------------------------------------------

/// Stored credential of an active user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    /// Argon2id PHC string.
    pub password_hash: String,
}

/// Lookup of active users' password hashes.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// The credential for `username` if that user exists and is active.
    async fn find_active(&self, username: &str) -> Result<Option<Credential>, StoreError>;
}

/// Credentials from the `usuarios_app` table.
#[derive(Clone)]
pub struct MySqlCredentialStore {
    pool: DbPool,
}

impl MySqlCredentialStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for MySqlCredentialStore {
    async fn find_active(&self, username: &str) -> Result<Option<Credential>, StoreError> {
        let user = UserRepo::find_active(&self.pool, username)
            .await
            .map_err(StoreError::from_read)?;
        Ok(user.map(|u| Credential {
            username: u.usuario,
            password_hash: u.senha_hash,
        }))
    }
}

/// Credentials fixed at start-up, for deployments without a database.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialStore {
    users: HashMap<String, String>,
}

impl StaticCredentialStore {
    pub fn new(users: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            users: users.into_iter().collect(),
        }
    }

    /// Parse `user=phc_hash` pairs separated by `;`.
    ///
    /// PHC strings contain `=` themselves, so only the first `=` of each pair
    /// separates the username.
    pub fn parse(entries: &str) -> Result<Self, String> {
        let mut users = HashMap::new();
        for entry in entries.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (user, hash) = entry
                .split_once('=')
                .ok_or_else(|| format!("Credential entry '{entry}' is missing '='"))?;
            let (user, hash) = (user.trim(), hash.trim());
            if user.is_empty() || hash.is_empty() {
                return Err(format!("Credential entry '{entry}' is incomplete"));
            }
            users.insert(user.to_string(), hash.to_string());
        }
        Ok(Self { users })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl CredentialStore for StaticCredentialStore {
    async fn find_active(&self, username: &str) -> Result<Option<Credential>, StoreError> {
        Ok(self.users.get(username).map(|hash| Credential {
            username: username.to_string(),
            password_hash: hash.clone(),
        }))
    }
}
