//! JWT Authentication Middleware
//!
//! Extracts the session JWT from the `session_token` cookie or the
//! `Authorization: Bearer` header, validates it, and makes the caller
//! available to handlers as an [`AuthUser`] extension.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use synergazing_auth::JwtValidator;
use tracing::debug;
use uuid::Uuid;

use crate::models::ErrorResponse;

/// Authenticated caller extracted from the session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
}

/// JWT validation state shared across middleware instances
#[derive(Clone)]
pub struct JwtState {
    pub validator: Arc<JwtValidator>,
}

impl JwtState {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            validator: Arc::new(JwtValidator::new(secret)),
        }
    }
}

type AuthRejection = (StatusCode, Json<ErrorResponse>);

fn unauthorized(message: impl Into<String>, code: &str) -> AuthRejection {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new(message, code)),
    )
}

/// Raw token from the cookie (preferred) or the Authorization header.
/// `Ok(None)` when neither is present.
fn extract_token(headers: &HeaderMap) -> Result<Option<String>, AuthRejection> {
    let from_cookie = headers
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .map(|c| c.trim())
                .find_map(|c| c.strip_prefix("session_token="))
        });
    if let Some(token) = from_cookie {
        return Ok(Some(token.to_string()));
    }

    let Some(auth_header) = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        return Ok(None);
    };

    auth_header
        .strip_prefix("Bearer ")
        .map(|t| Some(t.to_string()))
        .ok_or_else(|| {
            unauthorized(
                "Invalid Authorization header format. Expected 'Bearer <token>'",
                "INVALID_AUTH_FORMAT",
            )
        })
}

fn authenticate(state: &JwtState, token: &str) -> Result<AuthUser, AuthRejection> {
    let claims = state
        .validator
        .validate(token)
        .map_err(|e| unauthorized(format!("Invalid or expired token: {}", e), "INVALID_TOKEN"))?;

    match claims.token_type.as_deref() {
        Some(_) if claims.is_session() => {}
        Some(other) => {
            return Err(unauthorized(
                format!(
                    "Invalid token type '{}'. Expected 'session' token for API access",
                    other
                ),
                "INVALID_TOKEN_TYPE",
            ));
        }
        None => {
            return Err(unauthorized(
                "Token missing 'token_type' claim",
                "MISSING_TOKEN_TYPE",
            ));
        }
    }

    let user_id = claims
        .user_id()
        .map_err(|e| unauthorized(e.to_string(), "INVALID_SUBJECT"))?;

    Ok(AuthUser {
        user_id,
        email: claims.email,
    })
}

/// Reject the request with 401 unless it carries a valid session token
pub async fn require_auth(
    State(state): State<Arc<JwtState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let token = extract_token(request.headers())?.ok_or_else(|| {
        unauthorized(
            "Missing authentication token (cookie or Authorization header)",
            "MISSING_AUTH",
        )
    })?;

    let auth_user = authenticate(&state, &token)?;
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Attach an [`AuthUser`] when a valid session token is present; anonymous
/// requests pass through untouched. A token that is present but invalid is
/// still rejected.
pub async fn optional_auth(
    State(state): State<Arc<JwtState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    if let Some(token) = extract_token(request.headers())? {
        let auth_user = authenticate(&state, &token)?;
        request.extensions_mut().insert(auth_user);
    } else {
        debug!("Anonymous request to {}", request.uri().path());
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, middleware, routing::get, Extension, Router};
    use chrono::Duration;
    use synergazing_auth::JwtClaims;
    use tower::ServiceExt; // For oneshot()

    const SECRET: &[u8] = b"test-secret-key";

    async fn protected_handler(Extension(user): Extension<AuthUser>) -> Json<AuthUser> {
        Json(user)
    }

    async fn maybe_handler(user: Option<Extension<AuthUser>>) -> String {
        match user {
            Some(Extension(user)) => user.user_id.to_string(),
            None => "anonymous".to_string(),
        }
    }

    fn create_test_app() -> Router {
        let jwt_state = Arc::new(JwtState::new(SECRET));

        let protected = Router::new()
            .route("/protected", get(protected_handler))
            .layer(middleware::from_fn_with_state(
                jwt_state.clone(),
                require_auth,
            ));
        let optional = Router::new()
            .route("/optional", get(maybe_handler))
            .layer(middleware::from_fn_with_state(jwt_state, optional_auth));

        protected.merge(optional)
    }

    fn session_token(user_id: Uuid, validity: Duration) -> String {
        let claims = JwtClaims::session(user_id, "alice@example.com", validity);
        JwtValidator::encode(SECRET, &claims).unwrap()
    }

    async fn error_body(response: Response) -> ErrorResponse {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_auth_middleware_valid_session_token() {
        let user_id = Uuid::new_v4();
        let token = session_token(user_id, Duration::hours(1));

        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let auth_user: AuthUser = serde_json::from_slice(&body).unwrap();
        assert_eq!(auth_user.user_id, user_id);
        assert_eq!(auth_user.email.as_deref(), Some("alice@example.com"));
    }

    #[tokio::test]
    async fn test_auth_middleware_accepts_cookie() {
        let user_id = Uuid::new_v4();
        let token = session_token(user_id, Duration::hours(1));

        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Cookie", format!("theme=dark; session_token={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_auth_middleware_missing_token() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let error = error_body(response).await;
        assert_eq!(error.code.as_deref(), Some("MISSING_AUTH"));
    }

    #[tokio::test]
    async fn test_auth_middleware_invalid_bearer_format() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Authorization", "Token abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let error = error_body(response).await;
        assert!(error.error.contains("Invalid Authorization header format"));
    }

    #[tokio::test]
    async fn test_auth_middleware_expired_token() {
        let token = session_token(Uuid::new_v4(), Duration::seconds(-10));

        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let error = error_body(response).await;
        assert!(error.error.contains("Invalid or expired token"));
    }

    #[tokio::test]
    async fn test_auth_middleware_wrong_secret() {
        let claims = JwtClaims::session(Uuid::new_v4(), "a@example.com", Duration::hours(1));
        let token = JwtValidator::encode(b"wrong-secret-key", &claims).unwrap();

        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_auth_middleware_rejects_non_session_token() {
        let claims = JwtClaims::new(Uuid::new_v4(), Duration::hours(1))
            .with_token_type("refresh".to_string());
        let token = JwtValidator::encode(SECRET, &claims).unwrap();

        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let error = error_body(response).await;
        assert!(error.error.contains("Invalid token type"));
    }

    #[tokio::test]
    async fn test_optional_auth_allows_anonymous() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/optional")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"anonymous");
    }

    #[tokio::test]
    async fn test_optional_auth_attaches_user() {
        let user_id = Uuid::new_v4();
        let token = session_token(user_id, Duration::hours(1));

        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/optional")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&body), user_id.to_string());
    }
}
