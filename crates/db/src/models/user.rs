use sqlx::FromRow;

/// A row from the `usuarios_app` table.
#[derive(Debug, Clone, FromRow)]
pub struct AppUser {
    pub usuario: String,
    pub senha_hash: String,
    pub ativo: bool,
}
