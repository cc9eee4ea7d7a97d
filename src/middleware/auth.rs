//! Admin session gate.
//!
//! Protected admin routes pass through here:
//! 1. The `AUTH` cookie is extracted from the request
//! 2. Its token is validated against the in-memory session cache,
//!    which also refreshes the session's sliding expiry
//! 3. A typed `SessionContext` is attached to the request for handlers
//! 4. The cookie is re-set on the response so its Max-Age tracks the
//!    refreshed cache entry
//!
//! Requests without a valid session are redirected to the login page.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

/// Name of the admin session cookie.
pub const AUTH_COOKIE: &str = "AUTH";

/// Session identity attached to authenticated admin requests.
///
/// Populated once by `require_session` and read by downstream handlers
/// through `Extension<SessionContext>`; no dynamic casting anywhere.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub username: String,
    pub admin_tab: bool,
}

/// Admit or redirect a request based on its session cookie.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| cookie_value(h, AUTH_COOKIE))
        .ok_or(AppError::SessionRequired)?
        .to_owned();

    let (username, admin_tab) = state
        .sessions
        .validate(&token)
        .ok_or(AppError::SessionRequired)?;

    request
        .extensions_mut()
        .insert(SessionContext { username, admin_tab });

    let mut response = next.run(request).await;
    response.headers_mut().append(
        header::SET_COOKIE,
        session_cookie(&token, state.sessions.ttl().as_secs()),
    );
    Ok(response)
}

/// Require the adminTab privilege on top of a valid session.
///
/// Layered inside `require_session`, so the context is already present.
pub async fn require_admin_tab(request: Request, next: Next) -> Result<Response, AppError> {
    let session = request
        .extensions()
        .get::<SessionContext>()
        .ok_or(AppError::SessionRequired)?;

    if !session.admin_tab {
        return Err(AppError::AccessDenied);
    }

    Ok(next.run(request).await)
}

/// The session cookie with its one fixed attribute policy.
///
/// HttpOnly keeps scripts away from the token, Secure keeps it off plain
/// HTTP, and the Max-Age mirrors the cache's sliding window.
pub fn session_cookie(token: &str, max_age_secs: u64) -> HeaderValue {
    let cookie =
        format!("{AUTH_COOKIE}={token}; Path=/; Max-Age={max_age_secs}; HttpOnly; Secure; SameSite=Strict");
    HeaderValue::from_str(&cookie).expect("token is base64, the cookie string is always ASCII")
}

/// Expired variant used by logout.
pub fn clear_session_cookie() -> HeaderValue {
    let cookie =
        format!("{AUTH_COOKIE}=; Path=/; Max-Age=0; HttpOnly; Secure; SameSite=Strict");
    HeaderValue::from_str(&cookie).expect("the cookie string is always ASCII")
}

/// Pull one cookie's value out of a `Cookie` request header.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v)
    })
}
