//! Bearer-token extractor that resolves the caller's session context.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use roster_core::error::CoreError;
use uuid::Uuid;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::session::SessionHandle;
use crate::state::AppState;

/// The authenticated caller and the session their token is bound to.
///
/// ```ignore
/// async fn my_handler(auth: AuthSession) -> AppResult<Json<()>> {
///     let ctx = auth.context.lock().await;
///     tracing::info!(user = %auth.username, filters = ?ctx.filters, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Clone)]
pub struct AuthSession {
    pub username: String,
    pub session_id: Uuid,
    pub context: SessionHandle,
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.into()))
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| unauthorized("Invalid Authorization format. Expected: Bearer <token>"))?;

        let claims = validate_token(token, &state.config.jwt)
            .map_err(|_| unauthorized("Invalid or expired token"))?;

        let session_id = claims
            .session_id()
            .ok_or_else(|| unauthorized("Invalid or expired token"))?;

        let context = state
            .sessions
            .get(session_id)
            .await
            .ok_or_else(|| unauthorized("Session ended. Please log in again"))?;

        Ok(AuthSession {
            username: claims.sub,
            session_id,
            context,
        })
    }
}
