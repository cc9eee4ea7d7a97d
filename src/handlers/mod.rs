//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, form body, cookies)
//! 2. Delegates to a service or the session cache
//! 3. Returns HTTP response (JSON, redirect, status code)

/// Admin console session endpoints
pub mod admin;
/// Service health endpoint
pub mod health;
/// Reader-facing API endpoints
pub mod requests;
