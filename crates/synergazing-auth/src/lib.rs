//! Session tokens and password hashing for Synergazing users

pub mod jwt;
pub mod password;

pub use jwt::{JwtClaims, JwtError, JwtValidator, SESSION_TOKEN_TYPE};
pub use password::{check_password_policy, hash_password, verify_password, PasswordError};
