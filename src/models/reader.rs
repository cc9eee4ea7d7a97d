//! Door reader model.
//!
//! A reader is a physical door controller. Its `apiKey` is the only
//! credential the device presents; the two flags gate what it may ask
//! the service to do beyond plain verification.

/// Represents a reader row from the database.
///
/// # Database Table
///
/// Maps to the `reader` table. Rows are always fetched *by* apiKey, so
/// the key itself is not carried around after the lookup.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Reader {
    /// Unique identifier, recorded in every audit entry this device causes
    pub id: i64,

    /// Whether this reader may provision brand-new cards
    #[sqlx(rename = "addCard")]
    pub add_card: bool,

    /// Whether this reader may be handed a card's write key
    ///
    /// Read keys require no per-reader permission.
    #[sqlx(rename = "writeCard")]
    pub write_card: bool,
}
