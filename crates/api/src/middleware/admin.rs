//! Admin-token extractor for Axum handlers.
//!
//! The admin surface is gated by a single shared secret compared against
//! the `x-admin-token` header. This is a trust boundary, not an identity
//! system: the extractor is the one place the comparison lives, so
//! swapping in a real authorization scheme later touches nothing else.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use els_core::CoreError;

use crate::error::AppError;
use crate::state::AppState;

/// Proof that the caller presented the admin secret.
///
/// Use as an extractor parameter in any handler that is admin-only:
///
/// ```ignore
/// async fn export(_admin: AdminToken, State(state): State<AppState>) -> AppResult<Json<()>> {
///     ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AdminToken;

impl FromRequestParts<AppState> for AdminToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("x-admin-token")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing x-admin-token header".into(),
                ))
            })?;

        if token != state.config.admin_token {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid admin token".into(),
            )));
        }

        Ok(AdminToken)
    }
}
