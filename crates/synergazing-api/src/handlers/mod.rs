//! HTTP handlers, one module per resource

pub mod auth;
pub mod membership;
pub mod notifications;
pub mod projects;
pub mod skills;
pub mod system;
