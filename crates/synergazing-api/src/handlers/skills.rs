use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;
use synergazing_core::UserSkillView;

use crate::error::{api_error, ApiError};
use crate::middleware::AuthUser;
use crate::models::*;
use crate::AppState;

/// The authenticated user's profile skills
#[utoipa::path(
    get,
    path = "/api/skills",
    responses(
        (status = 200, description = "Profile skills, alphabetically", body = ApiResponse<Vec<UserSkillView>>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "skills"
)]
pub async fn list_user_skills(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<UserSkillView>>>, ApiError> {
    let skills = state
        .services
        .accounts
        .skills(user.user_id)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("User skills retrieved successfully", skills)))
}

/// Replace the authenticated user's profile skills
#[utoipa::path(
    post,
    path = "/api/skills",
    request_body = UpdateSkillsRequest,
    responses(
        (status = 200, description = "Skills replaced", body = ApiResponse<Vec<UserSkillView>>),
        (status = 400, description = "Empty list, blank or duplicate name, or proficiency outside 0-100", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "skills"
)]
pub async fn update_user_skills(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<UpdateSkillsRequest>,
) -> Result<Json<ApiResponse<Vec<UserSkillView>>>, ApiError> {
    let skills = state
        .services
        .accounts
        .update_skills(user.user_id, req.skills)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Skills updated successfully", skills)))
}

/// Remove one skill from the authenticated user's profile
#[utoipa::path(
    delete,
    path = "/api/skills/{name}",
    params(
        ("name" = String, Path, description = "Skill name, case-insensitive")
    ),
    responses(
        (status = 200, description = "Skill removed", body = ApiResponse<Vec<UserSkillView>>),
        (status = 404, description = "Unknown skill or not on the profile", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "skills"
)]
pub async fn remove_user_skill(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<Vec<UserSkillView>>>, ApiError> {
    state
        .services
        .accounts
        .remove_skill(user.user_id, &name)
        .await
        .map_err(api_error)?;

    let skills = state
        .services
        .accounts
        .skills(user.user_id)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Skill removed", skills)))
}
