//! HTTP middleware components.
//!
//! Middleware are functions that run before route handlers.
//! They can:
//! - Authenticate requests
//! - Modify request/response
//! - Short-circuit requests (redirect to login, deny access)

/// Admin session gate
pub mod auth;
