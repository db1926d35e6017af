//! Project wizard and project read endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use synergazing_core::{
    CatalogEntry, ProjectView, Stage1Input, Stage2Input, Stage3Input, Stage4Input, Stage5Input,
    TeamCapacityView,
};
use tracing::debug;
use uuid::Uuid;

use crate::error::{api_error, ApiError};
use crate::middleware::AuthUser;
use crate::models::*;
use crate::AppState;

/// Stage 1: create a draft project
#[utoipa::path(
    post,
    path = "/api/projects/stage1",
    request_body = Stage1Input,
    responses(
        (status = 201, description = "Draft project created", body = ApiResponse<ProjectView>),
        (status = 400, description = "Missing title, type, or description", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn create_stage1(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<Stage1Input>,
) -> Result<(StatusCode, Json<ApiResponse<ProjectView>>), ApiError> {
    let project = state
        .services
        .wizard
        .create_stage1(user.user_id, input)
        .await
        .map_err(api_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Project stage 1 saved", project)),
    ))
}

/// Stage 2: schedule and team size
#[utoipa::path(
    put,
    path = "/api/projects/{id}/stage2",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = Stage2Input,
    responses(
        (status = 200, description = "Stage 2 saved", body = ApiResponse<ProjectView>),
        (status = 400, description = "Invalid input, stage out of order, or capacity violation", body = ErrorResponse),
        (status = 403, description = "Caller is not the project creator", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn update_stage2(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<Stage2Input>,
) -> Result<Json<ApiResponse<ProjectView>>, ApiError> {
    let project = state
        .services
        .wizard
        .update_stage2(id, user.user_id, input)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Project stage 2 saved", project)))
}

/// Stage 3: time commitment, required skills, and conditions
#[utoipa::path(
    put,
    path = "/api/projects/{id}/stage3",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = Stage3Input,
    responses(
        (status = 200, description = "Stage 3 saved", body = ApiResponse<ProjectView>),
        (status = 400, description = "Invalid input or stage out of order", body = ErrorResponse),
        (status = 403, description = "Caller is not the project creator", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn update_stage3(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<Stage3Input>,
) -> Result<Json<ApiResponse<ProjectView>>, ApiError> {
    let project = state
        .services
        .wizard
        .update_stage3(id, user.user_id, input)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Project stage 3 saved", project)))
}

/// Stage 4: roles and directly seeded members
#[utoipa::path(
    put,
    path = "/api/projects/{id}/stage4",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = Stage4Input,
    responses(
        (status = 200, description = "Stage 4 saved", body = ApiResponse<ProjectView>),
        (status = 400, description = "Invalid input, stage out of order, or capacity exceeded", body = ErrorResponse),
        (status = 403, description = "Caller is not the project creator", body = ErrorResponse),
        (status = 404, description = "Project, seeded user, or role not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn update_stage4(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<Stage4Input>,
) -> Result<Json<ApiResponse<ProjectView>>, ApiError> {
    let project = state
        .services
        .wizard
        .update_stage4(id, user.user_id, input)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Project stage 4 saved", project)))
}

/// Stage 5: benefits, timeline, and tags; publishes the project
#[utoipa::path(
    put,
    path = "/api/projects/{id}/stage5",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = Stage5Input,
    responses(
        (status = 200, description = "Project published", body = ApiResponse<ProjectView>),
        (status = 400, description = "Invalid input or stage out of order", body = ErrorResponse),
        (status = 403, description = "Caller is not the project creator", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn update_stage5(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<Stage5Input>,
) -> Result<Json<ApiResponse<ProjectView>>, ApiError> {
    let project = state
        .services
        .wizard
        .update_stage5(id, user.user_id, input)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Project published", project)))
}

/// List all published projects
#[utoipa::path(
    get,
    path = "/api/projects/all",
    responses(
        (status = 200, description = "Published projects, newest first", body = ApiResponse<Vec<ProjectView>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "projects"
)]
pub async fn list_public_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ProjectView>>>, ApiError> {
    debug!("Listing published projects");

    let projects = state
        .services
        .queries
        .published_projects()
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Projects retrieved", projects)))
}

/// Get one published project
#[utoipa::path(
    get,
    path = "/api/projects/public/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project", body = ApiResponse<ProjectView>),
        (status = 404, description = "Project not found or not published", body = ErrorResponse)
    ),
    tag = "projects"
)]
pub async fn get_public_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProjectView>>, ApiError> {
    let project = state
        .services
        .queries
        .public_project(id)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Project retrieved", project)))
}

/// Projects the caller created or belongs to
#[utoipa::path(
    get,
    path = "/api/projects",
    responses(
        (status = 200, description = "Caller's projects", body = ApiResponse<Vec<ProjectView>>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn list_user_projects(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<ProjectView>>>, ApiError> {
    let projects = state
        .services
        .queries
        .user_projects(user.user_id)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Projects retrieved", projects)))
}

/// Projects the caller created
#[utoipa::path(
    get,
    path = "/api/projects/created",
    responses(
        (status = 200, description = "Created projects", body = ApiResponse<Vec<ProjectView>>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn list_created_projects(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<ProjectView>>>, ApiError> {
    let projects = state
        .services
        .queries
        .created_projects(user.user_id)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Projects retrieved", projects)))
}

/// Projects where the caller is an accepted member
#[utoipa::path(
    get,
    path = "/api/projects/member",
    responses(
        (status = 200, description = "Projects joined", body = ApiResponse<Vec<ProjectView>>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn list_member_projects(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<ProjectView>>>, ApiError> {
    let projects = state
        .services
        .queries
        .member_projects(user.user_id)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Projects retrieved", projects)))
}

/// One project visible to the caller (drafts included for their creator)
#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project", body = ApiResponse<ProjectView>),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn get_user_project(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProjectView>>, ApiError> {
    let project = state
        .services
        .queries
        .user_project(user.user_id, id)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Project retrieved", project)))
}

/// Delete a project and everything it owns
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project deleted", body = ApiResponse<Option<String>>),
        (status = 403, description = "Caller is not the project creator", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Option<String>>>, ApiError> {
    state
        .services
        .wizard
        .delete_project(id, user.user_id)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Project deleted", None)))
}

/// Team capacity breakdown
#[utoipa::path(
    get,
    path = "/api/projects/{id}/team-capacity",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Capacity, members, and roles", body = ApiResponse<TeamCapacityView>),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn team_capacity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TeamCapacityView>>, ApiError> {
    let capacity = state
        .services
        .queries
        .team_capacity(user.user_id, id)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Team capacity retrieved", capacity)))
}

/// Set the status of one timeline milestone
#[utoipa::path(
    put,
    path = "/api/projects/{id}/timeline/{timeline_id}/status",
    params(
        ("id" = Uuid, Path, description = "Project ID"),
        ("timeline_id" = Uuid, Path, description = "Timeline entry ID")
    ),
    request_body = TimelineStatusRequest,
    responses(
        (status = 200, description = "Timeline updated", body = ApiResponse<ProjectView>),
        (status = 403, description = "Caller is not the project creator", body = ErrorResponse),
        (status = 404, description = "Project or timeline entry not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn update_timeline_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((id, timeline_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<TimelineStatusRequest>,
) -> Result<Json<ApiResponse<ProjectView>>, ApiError> {
    let project = state
        .services
        .wizard
        .update_timeline_status(id, timeline_id, user.user_id, req.status)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Timeline status updated", project)))
}

/// The skill catalog
#[utoipa::path(
    get,
    path = "/api/skills/all",
    responses(
        (status = 200, description = "All skills, alphabetically", body = ApiResponse<Vec<CatalogEntry>>)
    ),
    tag = "skills"
)]
pub async fn list_skills(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<CatalogEntry>>>, ApiError> {
    let skills = state.services.queries.skills().await.map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Skills retrieved", skills)))
}
