//! Role-based access control extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use fleetlog_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` or `manager` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn delete(RequireManager(user): RequireManager) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireManager(pub AuthUser);

impl FromRequestParts<AppState> for RequireManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_privileged() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Manager or Admin role required".into(),
            )));
        }
        Ok(RequireManager(user))
    }
}
