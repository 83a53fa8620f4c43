use std::path::PathBuf;

use roster_core::spreadsheet::DEFAULT_SHEET_NAME;

use crate::auth::jwt::JwtConfig;

/// Where partner records and credentials live.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    /// `parceiros_jwm` / `usuarios_app` tables in MySQL.
    MySql {
        database_url: String,
        max_connections: u32,
    },
    /// Legacy spreadsheet file, with credentials supplied as
    /// `user=phc_hash` pairs separated by `;`.
    Workbook {
        path: PathBuf,
        sheet: String,
        users: String,
    },
}

impl StoreConfig {
    pub fn backend_name(&self) -> &'static str {
        match self {
            StoreConfig::MySql { .. } => "mysql",
            StoreConfig::Workbook { .. } => "workbook",
        }
    }

    /// | Env Var              | Default          |
    /// |----------------------|------------------|
    /// | `STORE_BACKEND`      | `mysql`          |
    /// | `DATABASE_URL`       | required (mysql) |
    /// | `DB_MAX_CONNECTIONS` | `5`              |
    /// | `WORKBOOK_PATH`      | `parceiros.xlsx` |
    /// | `WORKBOOK_SHEET`     | `PARCEIROS`      |
    /// | `ROSTER_USERS`       | empty            |
    pub fn from_env() -> Self {
        let backend = std::env::var("STORE_BACKEND").unwrap_or_else(|_| "mysql".into());

        match backend.trim().to_ascii_lowercase().as_str() {
            "mysql" => {
                let database_url =
                    std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
                let max_connections: u32 = std::env::var("DB_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "5".into())
                    .parse()
                    .expect("DB_MAX_CONNECTIONS must be a valid u32");
                StoreConfig::MySql {
                    database_url,
                    max_connections,
                }
            }
            "workbook" => StoreConfig::Workbook {
                path: std::env::var("WORKBOOK_PATH")
                    .unwrap_or_else(|_| "parceiros.xlsx".into())
                    .into(),
                sheet: std::env::var("WORKBOOK_SHEET")
                    .unwrap_or_else(|_| DEFAULT_SHEET_NAME.into()),
                users: std::env::var("ROSTER_USERS").unwrap_or_default(),
            },
            other => panic!("STORE_BACKEND must be 'mysql' or 'workbook', got '{other}'"),
        }
    }
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Largest accepted request body, spreadsheet uploads included.
    pub max_upload_bytes: usize,
    /// Minutes of inactivity after which a session context is dropped.
    pub session_idle_mins: u64,
    pub store: StoreConfig,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `MAX_UPLOAD_BYTES`     | `10485760`                 |
    /// | `SESSION_IDLE_MINS`    | `60`                       |
    ///
    /// Store and JWT settings are read by [`StoreConfig::from_env`] and
    /// [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| (10 * 1024 * 1024).to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let session_idle_mins: u64 = std::env::var("SESSION_IDLE_MINS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("SESSION_IDLE_MINS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_upload_bytes,
            session_idle_mins,
            store: StoreConfig::from_env(),
            jwt: JwtConfig::from_env(),
        }
    }
}
