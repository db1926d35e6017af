//! Applications, invitations, and team membership endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use synergazing_core::{
    ApplicationView, ApplyInput, InvitationView, InviteInput, MemberView, ReviewAction,
};
use uuid::Uuid;

use crate::error::{api_error, ApiError};
use crate::middleware::AuthUser;
use crate::models::*;
use crate::AppState;

/// Apply for a role on a published project
#[utoipa::path(
    post,
    path = "/api/projects/{id}/apply",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = ApplyInput,
    responses(
        (status = 201, description = "Application submitted", body = ApiResponse<ApplicationView>),
        (status = 400, description = "Project closed, duplicate application, or missing motivation", body = ErrorResponse),
        (status = 404, description = "Project or role not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "applications"
)]
pub async fn apply(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<ApplyInput>,
) -> Result<(StatusCode, Json<ApiResponse<ApplicationView>>), ApiError> {
    let application = state
        .services
        .membership
        .apply(user.user_id, id, input)
        .await
        .map_err(api_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Application submitted", application)),
    ))
}

/// Applications of a project (creator only)
#[utoipa::path(
    get,
    path = "/api/projects/{id}/applications",
    params(("id" = Uuid, Path, description = "Project ID"), ApplicationQuery),
    responses(
        (status = 200, description = "Applications, newest first", body = ApiResponse<Vec<ApplicationView>>),
        (status = 403, description = "Caller is not the project creator", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "applications"
)]
pub async fn list_project_applications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Query(query): Query<ApplicationQuery>,
) -> Result<Json<ApiResponse<Vec<ApplicationView>>>, ApiError> {
    let applications = state
        .services
        .membership
        .project_applications(id, user.user_id, query.status)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Applications retrieved", applications)))
}

/// One application (applicant or project creator)
#[utoipa::path(
    get,
    path = "/api/applications/{id}",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application", body = ApiResponse<ApplicationView>),
        (status = 403, description = "Caller may not view this application", body = ErrorResponse),
        (status = 404, description = "Application not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "applications"
)]
pub async fn get_application(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ApplicationView>>, ApiError> {
    let application = state
        .services
        .membership
        .application(id, user.user_id)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Application retrieved", application)))
}

/// Accept or reject a pending application
#[utoipa::path(
    put,
    path = "/api/applications/{id}/review",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Application reviewed", body = ApiResponse<ApplicationView>),
        (status = 400, description = "Already reviewed or no slots left", body = ErrorResponse),
        (status = 403, description = "Caller is not the project creator", body = ErrorResponse),
        (status = 404, description = "Application or role not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "applications"
)]
pub async fn review_application(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<ApiResponse<ApplicationView>>, ApiError> {
    let application = state
        .services
        .membership
        .review(id, user.user_id, req.action, req.review_notes)
        .await
        .map_err(api_error)?;

    let message = match req.action {
        ReviewAction::Accept => "Application accepted",
        ReviewAction::Reject => "Application rejected",
    };
    Ok(Json(ApiResponse::ok(message, application)))
}

/// Withdraw one's own pending application
#[utoipa::path(
    put,
    path = "/api/applications/{id}/withdraw",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application withdrawn", body = ApiResponse<ApplicationView>),
        (status = 400, description = "Application is no longer pending", body = ErrorResponse),
        (status = 403, description = "Not the caller's application", body = ErrorResponse),
        (status = 404, description = "Application not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "applications"
)]
pub async fn withdraw_application(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ApplicationView>>, ApiError> {
    let application = state
        .services
        .membership
        .withdraw(id, user.user_id)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Application withdrawn", application)))
}

/// The caller's applications
#[utoipa::path(
    get,
    path = "/api/user/applications",
    responses(
        (status = 200, description = "Applications, newest first", body = ApiResponse<Vec<ApplicationView>>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "applications"
)]
pub async fn list_user_applications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<ApplicationView>>>, ApiError> {
    let applications = state
        .services
        .membership
        .user_applications(user.user_id)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Applications retrieved", applications)))
}

/// Invitations waiting for the caller's answer
#[utoipa::path(
    get,
    path = "/api/user/project-invitations",
    responses(
        (status = 200, description = "Pending invitations", body = ApiResponse<Vec<InvitationView>>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "invitations"
)]
pub async fn list_user_invitations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<InvitationView>>>, ApiError> {
    let invitations = state
        .services
        .membership
        .user_invitations(user.user_id)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Invitations retrieved", invitations)))
}

/// Team members of a project
///
/// Public for published projects; drafts are visible to their creator and
/// members only.
#[utoipa::path(
    get,
    path = "/api/projects/{id}/members",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Members", body = ApiResponse<Vec<MemberView>>),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    tag = "invitations"
)]
pub async fn list_project_members(
    State(state): State<Arc<AppState>>,
    user: Option<Extension<AuthUser>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<MemberView>>>, ApiError> {
    let caller = user.map(|Extension(user)| user.user_id);

    let members = state
        .services
        .membership
        .project_members(id, caller)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Members retrieved", members)))
}

/// Invite a user into a role
#[utoipa::path(
    post,
    path = "/api/projects/{id}/invite",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = InviteInput,
    responses(
        (status = 201, description = "Invitation sent", body = ApiResponse<MemberView>),
        (status = 400, description = "Already a member, pending application, or no slots left", body = ErrorResponse),
        (status = 403, description = "Caller is not the project creator", body = ErrorResponse),
        (status = 404, description = "Project, role, or user not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "invitations"
)]
pub async fn invite_member(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<InviteInput>,
) -> Result<(StatusCode, Json<ApiResponse<MemberView>>), ApiError> {
    let member = state
        .services
        .membership
        .invite(id, user.user_id, input)
        .await
        .map_err(api_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Invitation sent", member)),
    ))
}

/// Accept or decline a pending invitation
#[utoipa::path(
    put,
    path = "/api/projects/{id}/invitation/respond",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = RespondInvitationRequest,
    responses(
        (status = 200, description = "Invitation answered", body = ApiResponse<MemberView>),
        (status = 404, description = "No pending invitation", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "invitations"
)]
pub async fn respond_invitation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<RespondInvitationRequest>,
) -> Result<Json<ApiResponse<MemberView>>, ApiError> {
    let member = state
        .services
        .membership
        .respond_to_invitation(id, user.user_id, req.response)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Invitation answered", member)))
}

/// Remove a member from the team
#[utoipa::path(
    delete,
    path = "/api/projects/{id}/members/{user_id}",
    params(
        ("id" = Uuid, Path, description = "Project ID"),
        ("user_id" = Uuid, Path, description = "User to remove")
    ),
    responses(
        (status = 200, description = "Member removed", body = ApiResponse<Option<String>>),
        (status = 400, description = "The creator cannot be removed", body = ErrorResponse),
        (status = 403, description = "Caller is not the project creator", body = ErrorResponse),
        (status = 404, description = "Project or member not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "invitations"
)]
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<Option<String>>>, ApiError> {
    state
        .services
        .membership
        .remove_member(id, user_id, user.user_id)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Member removed", None)))
}
