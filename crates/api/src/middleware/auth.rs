//! Bearer-token extractor for the data-entry API.
//!
//! Every `/api/v1` route except login takes an [`AuthUser`]. The token is the
//! one issued by `POST /api/v1/auth/login` and carries the account id and its
//! role (`admin`, `manager` or `user`).

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use fleetlog_core::error::CoreError;
use fleetlog_core::roles::is_privileged;
use fleetlog_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// The signed-in data-entry account.
///
/// ```ignore
/// async fn save(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, role = %user.role, "saving trip");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Row id in `users`.
    pub user_id: DbId,
    /// `admin`, `manager` or `user`.
    pub role: String,
}

impl AuthUser {
    /// Managers and admins may delete catalog rows and create accounts.
    pub fn is_privileged(&self) -> bool {
        is_privileged(&self.role)
    }
}

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.into()))
}

/// Pull the token out of an `Authorization: Bearer <token>` value.
///
/// The scheme is matched case-insensitively; a blank token is refused.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("Sign in to continue"))?;

        let token = bearer_token(header).ok_or_else(|| {
            unauthorized("Invalid Authorization format. Expected: Bearer <token>")
        })?;

        let claims = validate_token(token, &state.config.jwt)
            .map_err(|_| unauthorized("Session expired, sign in again"))?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer  abc.def "), Some("abc.def"));
    }

    #[test]
    fn other_schemes_and_blank_tokens_are_refused() {
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc.def"), None);
    }

    #[test]
    fn only_managers_and_admins_are_privileged() {
        let user = |role: &str| AuthUser {
            user_id: 1,
            role: role.into(),
        };
        assert!(user("admin").is_privileged());
        assert!(user("manager").is_privileged());
        assert!(!user("user").is_privileged());
    }
}
