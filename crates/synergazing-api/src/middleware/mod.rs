//! API Middleware
//!
//! Session authentication for protected and optionally-authenticated routes.

pub mod auth;

pub use auth::{optional_auth, require_auth, AuthUser, JwtState};
