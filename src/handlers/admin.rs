//! Admin console session endpoints.
//!
//! The console's HTML and CRUD tables are rendered by a separate frontend;
//! what lives here is the session lifecycle that frontend depends on:
//! login, logout, and the gated status routes that prove a session (and,
//! for `/admin/admins`, the adminTab privilege) is present.

use axum::{
    Extension, Form, Json,
    extract::State,
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::{Value, json};

use crate::error::AppError;
use crate::middleware::auth::{self, SessionContext};
use crate::models::admin::{AdminCredentials, LoginForm};
use crate::password;
use crate::state::AppState;

/// `GET /` - the console lives under /admin.
pub async fn root() -> Redirect {
    Redirect::to("/admin")
}

/// `GET /admin/login` - landing spot for redirected requests.
///
/// The frontend renders the actual form; this body only tells a client
/// that no valid session was presented.
pub async fn login_page() -> Json<Value> {
    Json(json!({ "login": "required" }))
}

/// `POST /admin/login`.
///
/// Verifies the form credentials against the admins table, issues a
/// session token and sets the session cookie. Failed credentials bounce
/// back to the login page without detail; which half was wrong is not
/// disclosed.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let admin = sqlx::query_as::<_, AdminCredentials>(
        "SELECT pwhash, adminTab FROM admins WHERE username = ? LIMIT 1",
    )
    .bind(&form.username)
    .fetch_optional(&state.pool)
    .await?;

    let Some(admin) = admin else {
        tracing::info!(username = %form.username, "login attempt for unknown admin");
        return Ok(Redirect::to("/admin/login").into_response());
    };

    if !password::verify_password(&form.password, &admin.pwhash) {
        tracing::info!(username = %form.username, "failed admin login");
        return Ok(Redirect::to("/admin/login").into_response());
    }

    let token = state.sessions.issue(&form.username, admin.admin_tab)?;

    let mut response = Redirect::to("/admin").into_response();
    response.headers_mut().append(
        header::SET_COOKIE,
        auth::session_cookie(&token, state.sessions.ttl().as_secs()),
    );
    tracing::info!(username = %form.username, "admin logged in");
    Ok(response)
}

/// `GET /admin/logout` - drop the session and expire the cookie.
///
/// Works without a valid session: an expired cookie still gets cleared.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = headers
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| auth::cookie_value(h, auth::AUTH_COOKIE))
    {
        state.sessions.remove(token);
    }

    let mut response = Redirect::to("/admin/login").into_response();
    response
        .headers_mut()
        .append(header::SET_COOKIE, auth::clear_session_cookie());
    response
}

/// `GET /admin` - session-gated landing route.
pub async fn home(Extension(session): Extension<SessionContext>) -> Json<Value> {
    Json(json!({
        "username": session.username,
        "adminTab": session.admin_tab,
    }))
}

/// `GET /admin/admins` - additionally requires the adminTab privilege.
pub async fn admins_home(Extension(session): Extension<SessionContext>) -> Json<Value> {
    Json(json!({
        "section": "admins",
        "username": session.username,
    }))
}
