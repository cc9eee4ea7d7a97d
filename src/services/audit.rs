//! Append-only access log writer.
//!
//! Every verification or provisioning outcome lands here as exactly one
//! `accessLog` row, and the append must complete before the response goes
//! out; losing security history silently is worse than failing the
//! request.
//!
//! The writer is generic over the executor: decision branches append on
//! their own open transaction, while the one path that has already rolled
//! back (a duplicate serial during provisioning) appends straight on the
//! pool. There is no read side; the admin console queries the table on
//! its own.

use sqlx::SqliteExecutor;

use crate::error::AppError;
use crate::models::access_log::AccessLogEntry;

/// Append one row to the access log.
pub async fn append<'e, E>(executor: E, entry: &AccessLogEntry<'_>) -> Result<(), AppError>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO accessLog (card, reader, people, allowed, direction, comment)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(entry.card)
    .bind(entry.reader)
    .bind(entry.people)
    .bind(entry.allowed)
    .bind(entry.direction)
    .bind(entry.comment)
    .execute(executor)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{log_rows, test_pool};

    #[tokio::test]
    async fn appends_preserve_unresolved_identities_as_null() {
        let pool = test_pool().await;

        append(
            &pool,
            &AccessLogEntry::new(Some("S1"), None, None, false).with_comment("bad api key"),
        )
        .await
        .unwrap();
        append(&pool, &AccessLogEntry::new(Some("S1"), Some(7), Some(3), true))
            .await
            .unwrap();

        let rows = log_rows(&pool).await;
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].card.as_deref(), Some("S1"));
        assert_eq!(rows[0].reader, None);
        assert_eq!(rows[0].people, None);
        assert!(!rows[0].allowed);
        assert_eq!(rows[0].comment.as_deref(), Some("bad api key"));

        assert_eq!(rows[1].reader, Some(7));
        assert_eq!(rows[1].people, Some(3));
        assert!(rows[1].allowed);
        assert_eq!(rows[1].comment, None);
    }

    #[tokio::test]
    async fn appends_ride_the_callers_transaction() {
        let pool = test_pool().await;

        // Rolled back: the row must not survive.
        let mut tx = pool.begin().await.unwrap();
        append(&mut *tx, &AccessLogEntry::new(Some("S2"), None, None, false))
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        assert!(log_rows(&pool).await.is_empty());

        // Committed: the row must survive.
        let mut tx = pool.begin().await.unwrap();
        append(&mut *tx, &AccessLogEntry::new(Some("S2"), None, None, false))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(log_rows(&pool).await.len(), 1);
    }
}
