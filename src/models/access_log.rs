//! Access log write model.

/// One append-only `accessLog` row.
///
/// Every identity field is optional: a request that failed before a
/// reader, card, or person was resolved logs NULL for that column.
#[derive(Debug)]
pub struct AccessLogEntry<'a> {
    /// Serial number the request claimed, if a body was parsed
    pub card: Option<&'a str>,

    /// Resolved reader id, if the apiKey matched a device
    pub reader: Option<i64>,

    /// Resolved person id, if the card matched an owner
    pub people: Option<i64>,

    /// The decision this row records
    pub allowed: bool,

    /// Door direction; no current caller sets it
    pub direction: Option<&'a str>,

    pub comment: Option<&'a str>,
}

impl<'a> AccessLogEntry<'a> {
    /// An entry for a plain allow/deny decision without commentary.
    pub fn new(
        card: Option<&'a str>,
        reader: Option<i64>,
        people: Option<i64>,
        allowed: bool,
    ) -> Self {
        Self {
            card,
            reader,
            people,
            allowed,
            direction: None,
            comment: None,
        }
    }

    /// Attach an operator-facing note to the entry.
    pub fn with_comment(mut self, comment: &'a str) -> Self {
        self.comment = Some(comment);
        self
    }
}
