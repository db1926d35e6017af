//! JWT session tokens (HS256)

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// `token_type` claim carried by tokens issued at login/registration
pub const SESSION_TOKEN_TYPE: &str = "session";

/// Claims of a user session token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JwtClaims {
    /// Subject (user UUID)
    pub sub: String,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
    /// User email at issue time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Token type; only "session" tokens are accepted by the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl JwtClaims {
    pub fn new(user_id: Uuid, validity: Duration) -> Self {
        let now = Utc::now();
        let exp = now + validity;

        Self {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            email: None,
            token_type: None,
        }
    }

    /// Session token for a freshly authenticated user
    pub fn session(user_id: Uuid, email: &str, validity: Duration) -> Self {
        Self::new(user_id, validity)
            .with_email(email.to_string())
            .with_token_type(SESSION_TOKEN_TYPE.to_string())
    }

    pub fn with_email(mut self, email: String) -> Self {
        self.email = Some(email);
        self
    }

    pub fn with_token_type(mut self, token_type: String) -> Self {
        self.token_type = Some(token_type);
        self
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    pub fn is_session(&self) -> bool {
        self.token_type.as_deref() == Some(SESSION_TOKEN_TYPE)
    }

    /// Subject parsed as a user id
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|_| JwtError::InvalidSubject(self.sub.clone()))
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT encoding error: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Token expired")]
    TokenExpired,

    #[error("Token subject is not a user id: {0}")]
    InvalidSubject(String),
}

pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.validate_nbf = false;

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn validate(&self, token: &str) -> Result<JwtClaims, JwtError> {
        let token_data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation)?;

        if token_data.claims.is_expired() {
            return Err(JwtError::TokenExpired);
        }

        Ok(token_data.claims)
    }

    pub fn encode(secret: &[u8], claims: &JwtClaims) -> Result<String, JwtError> {
        let header = Header::new(Algorithm::HS256);
        let encoding_key = EncodingKey::from_secret(secret);

        Ok(encode(&header, claims, &encoding_key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &[u8] = b"test_secret_key_1234567890";

    #[test]
    fn test_session_token_round_trip() {
        let user_id = Uuid::new_v4();
        let claims = JwtClaims::session(user_id, "alice@example.com", Duration::hours(1));

        let token = JwtValidator::encode(TEST_SECRET, &claims).unwrap();
        let decoded = JwtValidator::new(TEST_SECRET).validate(&token).unwrap();

        assert_eq!(decoded.user_id().unwrap(), user_id);
        assert_eq!(decoded.email.as_deref(), Some("alice@example.com"));
        assert!(decoded.is_session());
    }

    #[test]
    fn test_expired_token() {
        // Past the default 60s leeway
        let claims = JwtClaims::session(Uuid::new_v4(), "a@b.c", Duration::seconds(-120));
        let token = JwtValidator::encode(TEST_SECRET, &claims).unwrap();

        assert!(JwtValidator::new(TEST_SECRET).validate(&token).is_err());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let claims = JwtClaims::session(Uuid::new_v4(), "a@b.c", Duration::hours(1));
        let token = JwtValidator::encode(TEST_SECRET, &claims).unwrap();

        let result = JwtValidator::new(b"another-secret").validate(&token);
        assert!(matches!(result, Err(JwtError::EncodingError(_))));
    }

    #[test]
    fn test_token_without_type_is_not_a_session() {
        let claims = JwtClaims::new(Uuid::new_v4(), Duration::hours(1));
        assert!(!claims.is_session());
    }

    #[test]
    fn test_non_uuid_subject() {
        let mut claims = JwtClaims::new(Uuid::new_v4(), Duration::hours(1));
        claims.sub = "client".to_string();

        assert!(matches!(claims.user_id(), Err(JwtError::InvalidSubject(_))));
    }
}
