//! Card verification service.
//!
//! Decides whether a card presented at a door should unlock it, and
//! records every decision.
//!
//! The lookup is two-staged on purpose: resolving the reader before the
//! card lets the audit trail distinguish "an unknown device tried to
//! verify" from "a known device rejected a forged card", which is the
//! interesting signal in a physical-security log.

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::access_log::AccessLogEntry;
use crate::models::card::VerifyResponse;
use crate::models::person::Person;
use crate::models::reader::Reader;
use crate::services::audit;

/// Verify a card presented at a reader.
///
/// # Process
///
/// 1. Resolve the reader by apiKey; an unknown key is still recorded
///    against the serial the request claimed
/// 2. Resolve the card by (authtoken, serialNumber), joined to its owner
/// 3. Append the audit row for whichever branch was taken
/// 4. Commit; a denial is a decision, not a failure, so every branch
///    below commits its transaction
///
/// # Errors
///
/// Only storage failures surface as `Err`; they roll back the open
/// transaction and fail this request alone.
pub async fn verify_card(
    pool: &DbPool,
    api_key: &str,
    authtoken: &str,
    serial_number: &str,
) -> Result<VerifyResponse, AppError> {
    let mut tx = pool.begin().await?;

    // Stage 1: which device is asking.
    let reader = sqlx::query_as::<_, Reader>(
        "SELECT id, addCard, writeCard FROM reader WHERE apiKey = ?",
    )
    .bind(api_key)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(reader) = reader else {
        audit::append(
            &mut *tx,
            &AccessLogEntry::new(Some(serial_number), None, None, false),
        )
        .await?;
        tx.commit().await?;
        return Ok(VerifyResponse::denied());
    };

    // Stage 2: the card and its owner. The join also rejects cards that
    // exist but are not assigned to anyone (owner 0 matches no person).
    let person = sqlx::query_as::<_, Person>(
        r#"
        SELECT p.id, p.name, p.permission
        FROM cards c
        JOIN people p ON p.id = c.owner
        WHERE c.authtoken = ? AND c.serialNumber = ?
        "#,
    )
    .bind(authtoken)
    .bind(serial_number)
    .fetch_optional(&mut *tx)
    .await?;

    match person {
        None => {
            audit::append(
                &mut *tx,
                &AccessLogEntry::new(Some(serial_number), Some(reader.id), None, false),
            )
            .await?;
            tx.commit().await?;
            Ok(VerifyResponse::denied())
        }
        Some(person) => {
            audit::append(
                &mut *tx,
                &AccessLogEntry::new(Some(serial_number), Some(reader.id), Some(person.id), true),
            )
            .await?;
            tx.commit().await?;
            Ok(VerifyResponse {
                ok: true,
                name: person.name,
                permission: person.permission,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{log_rows, seed_card, seed_person, seed_reader, test_pool};

    #[tokio::test]
    async fn valid_card_returns_owner_and_logs_allowed() {
        let pool = test_pool().await;
        let reader_id = seed_reader(&pool, "rk1", true, true).await;
        let alice = seed_person(&pool, "Alice", "staff").await;
        seed_card(&pool, "S1", "T1", "wk", "rk", alice).await;

        let response = verify_card(&pool, "rk1", "T1", "S1").await.unwrap();

        assert!(response.ok);
        assert_eq!(response.name, "Alice");
        assert_eq!(response.permission, "staff");

        let rows = log_rows(&pool).await;
        assert_eq!(rows.len(), 1);
        assert!(rows[0].allowed);
        assert_eq!(rows[0].card.as_deref(), Some("S1"));
        assert_eq!(rows[0].reader, Some(reader_id));
        assert_eq!(rows[0].people, Some(alice));
    }

    #[tokio::test]
    async fn unknown_api_key_is_denied_and_logged_without_a_reader() {
        let pool = test_pool().await;
        let alice = seed_person(&pool, "Alice", "staff").await;
        seed_card(&pool, "S1", "T1", "wk", "rk", alice).await;

        let response = verify_card(&pool, "not-a-key", "T1", "S1").await.unwrap();

        assert!(!response.ok);
        assert_eq!(response.name, "");
        assert_eq!(response.permission, "");

        let rows = log_rows(&pool).await;
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].allowed);
        // The claimed serial is recorded even though no reader matched.
        assert_eq!(rows[0].card.as_deref(), Some("S1"));
        assert_eq!(rows[0].reader, None);
        assert_eq!(rows[0].people, None);
    }

    #[tokio::test]
    async fn wrong_authtoken_is_denied_and_logged_against_the_reader() {
        let pool = test_pool().await;
        let reader_id = seed_reader(&pool, "rk1", false, false).await;
        let alice = seed_person(&pool, "Alice", "staff").await;
        seed_card(&pool, "S1", "T1", "wk", "rk", alice).await;

        let response = verify_card(&pool, "rk1", "T2", "S1").await.unwrap();

        assert!(!response.ok);

        let rows = log_rows(&pool).await;
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].allowed);
        assert_eq!(rows[0].reader, Some(reader_id));
        assert_eq!(rows[0].people, None);
    }

    #[tokio::test]
    async fn unassigned_card_is_denied() {
        let pool = test_pool().await;
        seed_reader(&pool, "rk1", false, false).await;
        // owner 0: provisioned but never assigned to a person.
        seed_card(&pool, "S1", "T1", "wk", "rk", 0).await;

        let response = verify_card(&pool, "rk1", "T1", "S1").await.unwrap();

        assert!(!response.ok);
        let rows = log_rows(&pool).await;
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].allowed);
    }
}
