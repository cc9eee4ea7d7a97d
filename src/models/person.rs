//! Card owner model.

/// A person who owns cards, as joined during verification.
///
/// Maps to the `people` table (`id`, `name`, `permission`). The
/// `permission` field is a free-text role tag the door firmware
/// interprets; the service just reports it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub permission: String,
}
