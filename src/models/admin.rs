//! Admin credential model and login form.

use serde::Deserialize;

/// Credential columns of an `admins` row, fetched by username at login.
#[derive(Debug, sqlx::FromRow)]
pub struct AdminCredentials {
    /// Argon2id hash in PHC string format
    pub pwhash: String,

    /// Whether this admin may open the admin-management tab
    #[sqlx(rename = "adminTab")]
    pub admin_tab: bool,
}

/// Form body for `POST /admin/login`.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}
