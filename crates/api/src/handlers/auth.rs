//! Handlers for the `/auth` resource.

use axum::extract::State;
use axum::Json;
use fleetlog_core::error::CoreError;
use fleetlog_core::types::DbId;
use fleetlog_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid email or password".into(),
    ))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password and return an access token.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = UserRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(invalid_credentials)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = user.id, "Rejected login with wrong password");
        return Err(invalid_credentials());
    }

    let jwt = &state.config.jwt;
    let access_token = generate_access_token(user.id, &user.role, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = user.id, role = %user.role, "User logged in");

    Ok(Json(DataResponse {
        data: AuthResponse {
            access_token,
            token_type: "Bearer",
            expires_in: jwt.access_token_expiry_mins * 60,
            user: UserInfo {
                id: user.id,
                name: user.name,
                email: user.email,
                role: user.role,
            },
        },
    }))
}
