//! Handlers for the `/auth` resource (login, logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use roster_core::error::CoreError;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthSession;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub username: String,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid username or password".into(),
    ))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Check the credentials against the active users and open a new session
/// context. Unknown, inactive and wrong-password logins are indistinguishable.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<LoginResponse>>> {
    let username = input.username.trim();
    if username.is_empty() || input.password.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Username and password are required".into(),
        )));
    }

    let credential = state
        .credentials
        .find_active(username)
        .await?
        .ok_or_else(|| {
            tracing::info!(username, "Login rejected: unknown or inactive user");
            invalid_credentials()
        })?;

    let valid = verify_password(&input.password, &credential.password_hash)
        .map_err(|e| AppError::InternalError(format!("Stored hash for '{username}' is unusable: {e}")))?;
    if !valid {
        tracing::info!(username, "Login rejected: wrong password");
        return Err(invalid_credentials());
    }

    let session_id = state.sessions.open(&credential.username).await;
    let access_token = generate_access_token(&credential.username, session_id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(Json(DataResponse {
        data: LoginResponse {
            access_token,
            token_type: "Bearer",
            expires_in: state.config.jwt.access_token_expiry_mins * 60,
            username: credential.username,
        },
    }))
}

/// POST /api/v1/auth/logout
///
/// Drop the caller's session context. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth: AuthSession) -> StatusCode {
    state.sessions.close(auth.session_id).await;
    tracing::info!(username = %auth.username, "Logged out");
    StatusCode::NO_CONTENT
}
