//! Request and response bodies of the HTTP API
//!
//! Domain views and inputs come from `synergazing-core`; this module adds the
//! response envelope and the bodies that exist only at the HTTP edge.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use synergazing_core::{Account, InvitationResponse, ReviewAction, SkillInput};
use synergazing_db::entities::{
    project_application::ApplicationStatus, project_timeline::TimelineStatus,
};

/// Success envelope wrapping every response payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`
    #[serde(default)]
    pub success: bool,
    /// Error message
    pub error: String,
    /// Machine-readable error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            success: false,
            error: error.into(),
            code: Some(code.to_string()),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Unique display name
    pub name: String,
    pub email: String,
    /// At least 8 characters
    pub password: String,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Session token plus the account it belongs to
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthResponse {
    /// Session JWT; send as `Authorization: Bearer <token>`
    pub token: String,
    pub user: Account,
}

/// Review decision for an application
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewRequest {
    pub action: ReviewAction,
    pub review_notes: Option<String>,
}

/// Answer to a pending invitation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RespondInvitationRequest {
    pub response: InvitationResponse,
}

/// Full replacement list of profile skills
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateSkillsRequest {
    pub skills: Vec<SkillInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TimelineStatusRequest {
    pub status: TimelineStatus,
}

/// Filter for the applications of a project
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ApplicationQuery {
    /// Only return applications with this status
    pub status: Option<ApplicationStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnreadCount {
    pub unread: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkedRead {
    /// Notifications that changed from unread to read
    pub updated: u64,
}
