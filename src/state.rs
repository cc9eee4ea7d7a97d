//! Shared application state.
//!
//! Constructed once at startup and handed to every handler through axum's
//! `State` extractor. There is no process-global service state; anything
//! a handler needs travels in here.

use std::sync::Arc;

use crate::db::DbPool;
use crate::session::SessionCache;

/// Everything the request handlers share.
#[derive(Clone)]
pub struct AppState {
    /// Credential store connection pool
    pub pool: DbPool,

    /// Live admin sessions
    pub sessions: Arc<SessionCache>,
}
