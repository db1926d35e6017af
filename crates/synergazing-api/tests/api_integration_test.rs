//! End-to-end tests driving the router in memory

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use synergazing_api::{ApiServer, ApiServerConfig};
use synergazing_core::Outbox;
use tower::ServiceExt; // For `oneshot` method

async fn create_test_app() -> Router {
    let db = synergazing_db::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    synergazing_db::migrate(&db)
        .await
        .expect("Failed to run migrations");

    let config = ApiServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        enable_cors: true,
        cors_origins: Vec::new(),
        jwt_secret: "test-secret".to_string(),
        session_hours: 1,
    };

    ApiServer::new(config, db, Outbox::disabled()).build_router()
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Register a user; returns (token, user id)
async fn register(app: &Router, name: &str) -> (String, String) {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": name,
            "email": format!("{}@example.com", name.to_lowercase()),
            "password": "correct horse battery"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

    (
        body["data"]["token"].as_str().unwrap().to_string(),
        body["data"]["user"]["id"].as_str().unwrap().to_string(),
    )
}

/// Run the wizard to publication; returns (project id, first role id)
async fn publish_project(app: &Router, token: &str, total_team: i64, slots: i64) -> (String, String) {
    let (status, body) = send(
        app,
        "POST",
        "/api/projects/stage1",
        Some(token),
        Some(json!({
            "title": "Open Source Telescope",
            "project_type": "hackathon",
            "description": "Build a telescope control system"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "stage1 failed: {}", body);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let now = chrono::Utc::now();
    let (status, body) = send(
        app,
        "PUT",
        &format!("/api/projects/{}/stage2", id),
        Some(token),
        Some(json!({
            "duration": "3 months",
            "total_team": total_team,
            "start_date": (now + chrono::Duration::days(30)).to_rfc3339(),
            "end_date": (now + chrono::Duration::days(90)).to_rfc3339(),
            "location": "Remote",
            "registration_deadline": (now + chrono::Duration::days(20)).to_rfc3339()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "stage2 failed: {}", body);

    let (status, body) = send(
        app,
        "PUT",
        &format!("/api/projects/{}/stage3", id),
        Some(token),
        Some(json!({
            "time_commitment": "10 hours/week",
            "required_skills": ["Rust"],
            "conditions": ["Weekly sync"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "stage3 failed: {}", body);

    let (status, body) = send(
        app,
        "PUT",
        &format!("/api/projects/{}/stage4", id),
        Some(token),
        Some(json!({
            "roles": [{"name": "Backend", "slots_available": slots, "skill_names": ["Rust"]}],
            "members": []
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "stage4 failed: {}", body);
    let role_id = body["data"]["roles"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        app,
        "PUT",
        &format!("/api/projects/{}/stage5", id),
        Some(token),
        Some(json!({
            "benefits": ["Certificate"],
            "timeline": ["Kickoff"],
            "tags": ["astronomy"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "stage5 failed: {}", body);
    assert_eq!(body["data"]["status"], "published");

    (id, role_id)
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app().await;
    let (status, body) = send(&app, "GET", "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_register_and_login() {
    let app = create_test_app().await;
    let (token, user_id) = register(&app, "Alice").await;

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], user_id.as_str());
    assert!(body["data"].get("password_hash").is_none());

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "ALICE@example.com", "password": "correct horse battery"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["success"].as_bool().unwrap());
    assert!(!body["data"]["token"].as_str().unwrap().is_empty());

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "alice@example.com", "password": "wrong password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_register_rejects_short_password_and_duplicates() {
    let app = create_test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"name": "Bob", "email": "bob@example.com", "password": "short"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    register(&app, "Bob").await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"name": "Bobby", "email": "bob@example.com", "password": "long enough pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = create_test_app().await;

    let (status, body) = send(&app, "GET", "/api/projects", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "MISSING_AUTH");

    let (status, _) = send(&app, "GET", "/api/notifications", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wizard_flow_and_public_listing() {
    let app = create_test_app().await;
    let (token, _) = register(&app, "Alice").await;

    let (project_id, _) = publish_project(&app, &token, 4, 2).await;

    let (status, body) = send(&app, "GET", "/api/projects/all", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/projects/public/{}", project_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_team"], 4);
    assert_eq!(body["data"]["total_role_slots"], 2);
    assert_eq!(body["data"]["remaining_team"], 2);

    let (status, body) = send(&app, "GET", "/api/skills/all", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "Rust");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/projects/{}/team-capacity", project_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["filled_team"], 0);
    assert_eq!(body["data"]["roles"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_stage_errors_map_to_status_codes() {
    let app = create_test_app().await;
    let (alice, _) = register(&app, "Alice").await;
    let (mallory, _) = register(&app, "Mallory").await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/projects/stage1",
        Some(&alice),
        Some(json!({
            "title": "Draft",
            "project_type": "research",
            "description": "Not ready yet"
        })),
    )
    .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    // Out of order
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/projects/{}/stage5", id),
        Some(&alice),
        Some(json!({"benefits": ["Pizza"]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "STAGE_SEQUENCE");

    // Not the creator
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/projects/{}/stage3", id),
        Some(&mallory),
        Some(json!({"time_commitment": "1h", "required_skills": ["Go"]})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    // Drafts are invisible to the public
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/projects/public/{}", id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/projects/{}", uuid::Uuid::new_v4()),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_application_lifecycle_over_http() {
    let app = create_test_app().await;
    let (alice, _) = register(&app, "Alice").await;
    let (bob, bob_id) = register(&app, "Bob").await;
    let (project_id, role_id) = publish_project(&app, &alice, 4, 1).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/projects/{}/apply", project_id),
        Some(&bob),
        Some(json!({
            "project_role_id": role_id,
            "why_interested": "Stars",
            "skills_experience": "Rust",
            "contribution": "Drivers"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "apply failed: {}", body);
    let application_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/projects/{}/applications?status=pending", project_id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/applications/{}/review", application_id),
        Some(&bob),
        Some(json!({"action": "accept"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/applications/{}/review", application_id),
        Some(&alice),
        Some(json!({"action": "accept", "review_notes": "Welcome aboard"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "accepted");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/projects/{}/members", project_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["user"]["id"], bob_id.as_str());
    assert_eq!(body["data"][0]["status"], "accepted");

    let (status, body) = send(&app, "GET", "/api/projects/member", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // The only slot is taken now
    let (_, carol_id) = register(&app, "Carol").await;
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/projects/{}/invite", project_id),
        Some(&alice),
        Some(json!({"user_id": carol_id, "project_role_id": role_id})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CAPACITY_EXCEEDED");

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/projects/{}/members/{}", project_id, bob_id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/projects/{}/invite", project_id),
        Some(&alice),
        Some(json!({"user_id": carol_id, "project_role_id": role_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "invite failed: {}", body);
    assert_eq!(body["data"]["status"], "invited");
}

#[tokio::test]
async fn test_invitation_response_and_listing() {
    let app = create_test_app().await;
    let (alice, _) = register(&app, "Alice").await;
    let (bob, bob_id) = register(&app, "Bob").await;
    let (project_id, role_id) = publish_project(&app, &alice, 3, 2).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/projects/{}/invite", project_id),
        Some(&alice),
        Some(json!({"user_id": bob_id, "project_role_id": role_id, "role_description": "Firmware"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "GET", "/api/user/project-invitations", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["role_name"], "Backend");
    assert_eq!(body["data"][0]["role_description"], "Firmware");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/projects/{}/invitation/respond", project_id),
        Some(&bob),
        Some(json!({"response": "decline"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "declined");

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/projects/public/{}", project_id),
        None,
        None,
    )
    .await;
    assert_eq!(body["data"]["roles"][0]["slots_available"], 2);
    assert_eq!(body["data"]["filled_team"], 0);
}

#[tokio::test]
async fn test_notification_endpoints_start_empty() {
    let app = create_test_app().await;
    let (token, _) = register(&app, "Alice").await;

    let (status, body) = send(&app, "GET", "/api/notifications/count", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["unread"], 0);

    let (status, body) = send(&app, "PUT", "/api/notifications/read-all", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updated"], 0);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/notifications/{}/read", uuid::Uuid::new_v4()),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_skills_over_http() {
    let app = create_test_app().await;
    let (token, _) = register(&app, "Alice").await;

    let (status, _) = send(&app, "GET", "/api/skills", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        "POST",
        "/api/skills",
        Some(&token),
        Some(json!({
            "skills": [
                { "name": "Rust", "proficiency": 90 },
                { "name": "Go", "proficiency": 60 }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "update failed: {}", body);
    assert_eq!(body["data"][0]["name"], "Go");
    assert_eq!(body["data"][1]["proficiency"], 90);

    let (status, _) = send(
        &app,
        "POST",
        "/api/skills",
        Some(&token),
        Some(json!({ "skills": [{ "name": "Rust", "proficiency": 101 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "DELETE", "/api/skills/GO", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "GET", "/api/skills", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "Rust");

    // Profile skills feed the shared catalog
    let (status, body) = send(&app, "GET", "/api/skills/all", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_openapi_json_is_served() {
    let app = create_test_app().await;
    let (status, body) = send(&app, "GET", "/api/openapi.json", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/projects/stage1"].is_object());
}
