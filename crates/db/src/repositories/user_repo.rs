//! Repository for the `usuarios_app` table.

use sqlx::mysql::MySqlPool;

use crate::models::user::AppUser;

/// Column list for `usuarios_app` queries.
const COLUMNS: &str = "usuario, senha_hash, ativo";

pub struct UserRepo;

impl UserRepo {
    /// Find an active user by exact username.
    pub async fn find_active(
        pool: &MySqlPool,
        username: &str,
    ) -> Result<Option<AppUser>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM usuarios_app WHERE usuario = ? AND ativo = 1");
        sqlx::query_as::<_, AppUser>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }
}
