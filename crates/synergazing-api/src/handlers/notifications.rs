use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;
use synergazing_core::NotificationView;
use uuid::Uuid;

use crate::error::{api_error, ApiError};
use crate::middleware::AuthUser;
use crate::models::*;
use crate::AppState;

/// All of the caller's notifications
#[utoipa::path(
    get,
    path = "/api/notifications",
    responses(
        (status = 200, description = "Notifications, newest first", body = ApiResponse<Vec<NotificationView>>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<NotificationView>>>, ApiError> {
    let notifications = state
        .services
        .notifications
        .list(user.user_id, false)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Notifications retrieved", notifications)))
}

/// Unread notifications only
#[utoipa::path(
    get,
    path = "/api/notifications/unread",
    responses(
        (status = 200, description = "Unread notifications", body = ApiResponse<Vec<NotificationView>>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn list_unread_notifications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<NotificationView>>>, ApiError> {
    let notifications = state
        .services
        .notifications
        .list(user.user_id, true)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Notifications retrieved", notifications)))
}

#[utoipa::path(
    get,
    path = "/api/notifications/count",
    responses(
        (status = 200, description = "Unread count", body = ApiResponse<UnreadCount>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn unread_count(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<UnreadCount>>, ApiError> {
    let unread = state
        .services
        .notifications
        .unread_count(user.user_id)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Unread count retrieved", UnreadCount { unread })))
}

#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Marked as read", body = ApiResponse<NotificationView>),
        (status = 404, description = "Notification not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<NotificationView>>, ApiError> {
    let notification = state
        .services
        .notifications
        .mark_read(id, user.user_id)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Notification marked as read", notification)))
}

#[utoipa::path(
    put,
    path = "/api/notifications/read-all",
    responses(
        (status = 200, description = "All marked as read", body = ApiResponse<MarkedRead>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn mark_all_notifications_read(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<MarkedRead>>, ApiError> {
    let updated = state
        .services
        .notifications
        .mark_all_read(user.user_id)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok(
        "All notifications marked as read",
        MarkedRead { updated },
    )))
}

#[utoipa::path(
    delete,
    path = "/api/notifications/{id}",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification deleted", body = ApiResponse<Option<String>>),
        (status = 404, description = "Notification not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn delete_notification(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Option<String>>>, ApiError> {
    state
        .services
        .notifications
        .delete(id, user.user_id)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::ok("Notification deleted", None)))
}
