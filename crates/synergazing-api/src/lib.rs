//! HTTP API of the Synergazing backend
//!
//! axum router over the domain services in `synergazing-core`, with JWT
//! session authentication, an OpenAPI document, and Swagger UI.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use synergazing_core::{Outbox, Services};

/// Application state shared across handlers
pub struct AppState {
    pub services: Services,
    pub jwt_secret: String,
    pub session_hours: i64,
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Synergazing API",
        version = "0.1.0",
        description = "Project builder, team recruitment, and notifications",
        contact(
            name = "Synergazing Team",
            email = "team@synergazing.dev"
        )
    ),
    paths(
        handlers::system::health_check,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::current_user,
        handlers::projects::create_stage1,
        handlers::projects::update_stage2,
        handlers::projects::update_stage3,
        handlers::projects::update_stage4,
        handlers::projects::update_stage5,
        handlers::projects::list_public_projects,
        handlers::projects::get_public_project,
        handlers::projects::list_user_projects,
        handlers::projects::list_created_projects,
        handlers::projects::list_member_projects,
        handlers::projects::get_user_project,
        handlers::projects::delete_project,
        handlers::projects::team_capacity,
        handlers::projects::update_timeline_status,
        handlers::projects::list_skills,
        handlers::skills::list_user_skills,
        handlers::skills::update_user_skills,
        handlers::skills::remove_user_skill,
        handlers::membership::apply,
        handlers::membership::list_project_applications,
        handlers::membership::get_application,
        handlers::membership::review_application,
        handlers::membership::withdraw_application,
        handlers::membership::list_user_applications,
        handlers::membership::list_user_invitations,
        handlers::membership::list_project_members,
        handlers::membership::invite_member,
        handlers::membership::respond_invitation,
        handlers::membership::remove_member,
        handlers::notifications::list_notifications,
        handlers::notifications::list_unread_notifications,
        handlers::notifications::unread_count,
        handlers::notifications::mark_notification_read,
        handlers::notifications::mark_all_notifications_read,
        handlers::notifications::delete_notification,
    ),
    components(
        schemas(
            models::ErrorResponse,
            models::HealthResponse,
            models::RegisterRequest,
            models::LoginRequest,
            models::AuthResponse,
            models::ReviewRequest,
            models::RespondInvitationRequest,
            models::TimelineStatusRequest,
            models::UpdateSkillsRequest,
            models::UnreadCount,
            models::MarkedRead,
            synergazing_core::Account,
            synergazing_core::CatalogEntry,
            synergazing_core::SkillInput,
            synergazing_core::UserSkillView,
            synergazing_core::ProjectView,
            synergazing_core::TeamCapacityView,
            synergazing_core::ApplicationView,
            synergazing_core::InvitationView,
            synergazing_core::MemberView,
            synergazing_core::NotificationView,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "projects", description = "Project wizard and project listings"),
        (name = "applications", description = "Applying to projects and reviewing applications"),
        (name = "invitations", description = "Invitations and team membership"),
        (name = "notifications", description = "In-app notifications"),
        (name = "skills", description = "Skill catalog and profile skills"),
        (name = "auth", description = "Registration and login"),
        (name = "system", description = "System health endpoints")
    )
)]
pub struct ApiDoc;

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS (for browser clients)
    pub enable_cors: bool,
    /// Allowed CORS origins in addition to localhost
    pub cors_origins: Vec<String>,
    /// HS256 secret for session tokens
    pub jwt_secret: String,
    /// Validity of issued session tokens
    pub session_hours: i64,
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new API server. `outbox` receives notification events from
    /// every committed lifecycle transition.
    pub fn new(config: ApiServerConfig, db: DatabaseConnection, outbox: Outbox) -> Self {
        let state = Arc::new(AppState {
            services: Services::new(db, outbox),
            jwt_secret: config.jwt_secret.clone(),
            session_hours: config.session_hours,
        });

        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        use handlers::{auth, membership, notifications, projects, skills, system};

        let jwt_state = Arc::new(middleware::JwtState::new(
            self.config.jwt_secret.as_bytes(),
        ));

        // Build PUBLIC routes (no authentication required)
        let public_router = Router::new()
            .route("/api/health", get(system::health_check))
            .route("/api/auth/register", post(auth::register))
            .route("/api/auth/login", post(auth::login))
            .route("/api/projects/all", get(projects::list_public_projects))
            .route("/api/projects/public/{id}", get(projects::get_public_project))
            .route("/api/skills/all", get(projects::list_skills))
            .with_state(self.state.clone());

        // Routes that serve anonymous callers but honor a session if present
        let optional_router = Router::new()
            .route(
                "/api/projects/{id}/members",
                get(membership::list_project_members),
            )
            .with_state(self.state.clone())
            .layer(axum_middleware::from_fn_with_state(
                jwt_state.clone(),
                middleware::optional_auth,
            ));

        // Build PROTECTED routes (require session token authentication)
        let protected_router = Router::new()
            .route("/api/auth/me", get(auth::current_user))
            // Profile skills
            .route(
                "/api/skills",
                get(skills::list_user_skills).post(skills::update_user_skills),
            )
            .route("/api/skills/{name}", delete(skills::remove_user_skill))
            // Project wizard
            .route("/api/projects/stage1", post(projects::create_stage1))
            .route("/api/projects/{id}/stage2", put(projects::update_stage2))
            .route("/api/projects/{id}/stage3", put(projects::update_stage3))
            .route("/api/projects/{id}/stage4", put(projects::update_stage4))
            .route("/api/projects/{id}/stage5", put(projects::update_stage5))
            // Project reads
            .route("/api/projects", get(projects::list_user_projects))
            .route("/api/projects/created", get(projects::list_created_projects))
            .route("/api/projects/member", get(projects::list_member_projects))
            .route(
                "/api/projects/{id}",
                get(projects::get_user_project).delete(projects::delete_project),
            )
            .route(
                "/api/projects/{id}/team-capacity",
                get(projects::team_capacity),
            )
            .route(
                "/api/projects/{id}/timeline/{timeline_id}/status",
                put(projects::update_timeline_status),
            )
            // Applications
            .route("/api/projects/{id}/apply", post(membership::apply))
            .route(
                "/api/projects/{id}/applications",
                get(membership::list_project_applications),
            )
            .route("/api/applications/{id}", get(membership::get_application))
            .route(
                "/api/applications/{id}/review",
                put(membership::review_application),
            )
            .route(
                "/api/applications/{id}/withdraw",
                put(membership::withdraw_application),
            )
            .route(
                "/api/user/applications",
                get(membership::list_user_applications),
            )
            // Invitations and team
            .route(
                "/api/user/project-invitations",
                get(membership::list_user_invitations),
            )
            .route("/api/projects/{id}/invite", post(membership::invite_member))
            .route(
                "/api/projects/{id}/invitation/respond",
                put(membership::respond_invitation),
            )
            .route(
                "/api/projects/{id}/members/{user_id}",
                delete(membership::remove_member),
            )
            // Notifications
            .route("/api/notifications", get(notifications::list_notifications))
            .route(
                "/api/notifications/unread",
                get(notifications::list_unread_notifications),
            )
            .route("/api/notifications/count", get(notifications::unread_count))
            .route(
                "/api/notifications/read-all",
                put(notifications::mark_all_notifications_read),
            )
            .route(
                "/api/notifications/{id}/read",
                put(notifications::mark_notification_read),
            )
            .route(
                "/api/notifications/{id}",
                delete(notifications::delete_notification),
            )
            .with_state(self.state.clone())
            .layer(axum_middleware::from_fn_with_state(
                jwt_state,
                middleware::require_auth,
            ));

        let api_router = public_router
            .merge(optional_router)
            .merge(protected_router);

        // SwaggerUi serves /api/openapi.json itself
        let mut router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()))
            .merge(api_router)
            .layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            router = router.layer(self.cors_layer());
        }

        router
    }

    fn cors_layer(&self) -> CorsLayer {
        let extra_origins = self.config.cors_origins.clone();

        // Cookie auth needs credentials, which rules out a wildcard origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
            .allow_credentials(true)
            .allow_origin(AllowOrigin::predicate(
                move |origin: &HeaderValue, _| {
                    let origin = origin.to_str().unwrap_or("");
                    origin.starts_with("http://localhost:")
                        || origin.starts_with("http://127.0.0.1:")
                        || origin.starts_with("https://localhost:")
                        || origin.starts_with("https://127.0.0.1:")
                        || extra_origins.iter().any(|allowed| allowed == origin)
                },
            ))
    }

    /// Start the API server
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let router = self.build_router();

        info!("Starting API server on {}", self.config.bind_addr);
        info!(
            "OpenAPI spec: http://{}/api/openapi.json",
            self.config.bind_addr
        );
        info!("Swagger UI: http://{}/swagger-ui", self.config.bind_addr);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        axum::serve(listener, router)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().unwrap();

        assert!(json.contains("/api/projects/{id}/stage4"));
        assert!(json.contains("bearer_auth"));
    }
}
