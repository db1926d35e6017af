use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Duration;
use std::sync::Arc;
use synergazing_auth::{JwtClaims, JwtValidator};
use synergazing_core::{Account, ServiceError};
use tracing::info;

use crate::error::{api_error, ApiError};
use crate::middleware::AuthUser;
use crate::models::*;
use crate::AppState;

fn issue_session(state: &AppState, account: &Account) -> Result<String, ApiError> {
    let claims = JwtClaims::session(
        account.id,
        &account.email,
        Duration::hours(state.session_hours),
    );

    JwtValidator::encode(state.jwt_secret.as_bytes(), &claims)
        .map_err(|e| api_error(ServiceError::Internal(format!("Failed to sign token: {}", e))))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Invalid input or duplicate user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    let account = state
        .services
        .accounts
        .register(&req.name, &req.email, &req.password)
        .await
        .map_err(api_error)?;

    let token = issue_session(&state, &account)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "User registered successfully",
            AuthResponse {
                token,
                user: account,
            },
        )),
    ))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let account = state
        .services
        .accounts
        .authenticate(&req.email, &req.password)
        .await
        .map_err(api_error)?;

    let token = issue_session(&state, &account)?;
    info!("User {} logged in", account.id);

    Ok(Json(ApiResponse::ok(
        "Login successful",
        AuthResponse {
            token,
            user: account,
        },
    )))
}

/// The authenticated user's account
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<Account>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn current_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Account>>, ApiError> {
    let account = state
        .services
        .accounts
        .find(user.user_id)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("User retrieved successfully", account)))
}
