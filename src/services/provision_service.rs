//! Key issuance and card provisioning.
//!
//! Two operations share the same reader-authorization pattern:
//!
//! - handing an existing card's read or write key to a reader
//! - minting a brand-new card with freshly generated secrets
//!
//! Both append exactly one audit row per request, success or not.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::access_log::AccessLogEntry;
use crate::models::card::{AddCardResponse, CardKeys, KeyResponse};
use crate::models::reader::Reader;
use crate::services::audit;

/// Secret sizes in raw bytes, before base64.
const READ_KEY_BYTES: usize = 6;
const WRITE_KEY_BYTES: usize = 6;
const AUTHTOKEN_BYTES: usize = 16;

/// Hand an existing card's read or write key to an authorized reader.
///
/// # Process
///
/// 1. Resolve the reader by apiKey; unknown keys are denied and logged
/// 2. Fetch the card's keys by serial number
/// 3. For a write key, require the reader's writeCard permission; the
///    card being found does not help an unauthorized device
/// 4. Read keys need no per-reader permission
/// 5. Log the outcome with allowed = final ok, whatever branch ran
pub async fn issue_key(
    pool: &DbPool,
    api_key: &str,
    serial_number: &str,
    write: bool,
) -> Result<KeyResponse, AppError> {
    let mut tx = pool.begin().await?;

    let reader = sqlx::query_as::<_, Reader>(
        "SELECT id, addCard, writeCard FROM reader WHERE apiKey = ?",
    )
    .bind(api_key)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(reader) = reader else {
        audit::append(
            &mut *tx,
            &AccessLogEntry::new(Some(serial_number), None, None, false)
                .with_comment("bad api key"),
        )
        .await?;
        tx.commit().await?;
        return Ok(KeyResponse::denied());
    };

    let keys = sqlx::query_as::<_, CardKeys>(
        "SELECT writeKey, readKey FROM cards WHERE serialNumber = ?",
    )
    .bind(serial_number)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(keys) = keys else {
        audit::append(
            &mut *tx,
            &AccessLogEntry::new(Some(serial_number), Some(reader.id), None, false)
                .with_comment("unknown card"),
        )
        .await?;
        tx.commit().await?;
        return Ok(KeyResponse::denied());
    };

    if write && !reader.write_card {
        // Authorization failure, not a lookup miss: the card exists but
        // this device may not hold its write key.
        audit::append(
            &mut *tx,
            &AccessLogEntry::new(Some(serial_number), Some(reader.id), None, false)
                .with_comment("write key denied"),
        )
        .await?;
        tx.commit().await?;
        return Ok(KeyResponse::denied());
    }

    let (key, comment) = if write {
        (keys.write_key, "write key issued")
    } else {
        (keys.read_key, "read key issued")
    };

    audit::append(
        &mut *tx,
        &AccessLogEntry::new(Some(serial_number), Some(reader.id), None, true)
            .with_comment(comment),
    )
    .await?;
    tx.commit().await?;

    Ok(KeyResponse { ok: true, key })
}

/// Mint a brand-new card on behalf of an authorized reader.
///
/// # Process
///
/// 1. Resolve the reader by apiKey and require its addCard permission
/// 2. Generate the read key, write key, and authtoken as three
///    independent draws from the OS randomness source
/// 3. Insert the card with the given serial and no owner; assignment
///    happens later through the admin console
/// 4. A duplicate serial denies the request; the failed insert is rolled
///    back and the denial is still logged
///
/// The success response is the only time the authtoken is ever disclosed.
pub async fn add_card(
    pool: &DbPool,
    api_key: &str,
    serial_number: &str,
) -> Result<AddCardResponse, AppError> {
    let mut tx = pool.begin().await?;

    let reader = sqlx::query_as::<_, Reader>(
        "SELECT id, addCard, writeCard FROM reader WHERE apiKey = ?",
    )
    .bind(api_key)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(reader) = reader else {
        audit::append(
            &mut *tx,
            &AccessLogEntry::new(Some(serial_number), None, None, false)
                .with_comment("bad api key"),
        )
        .await?;
        tx.commit().await?;
        return Ok(AddCardResponse::denied());
    };

    if !reader.add_card {
        audit::append(
            &mut *tx,
            &AccessLogEntry::new(Some(serial_number), Some(reader.id), None, false)
                .with_comment("add card not permitted"),
        )
        .await?;
        tx.commit().await?;
        return Ok(AddCardResponse::denied());
    }

    // Three independent draws. The authtoken must never be derivable
    // from either key.
    let read_key = generate_secret(READ_KEY_BYTES)?;
    let write_key = generate_secret(WRITE_KEY_BYTES)?;
    let authtoken = generate_secret(AUTHTOKEN_BYTES)?;

    let inserted = sqlx::query(
        "INSERT INTO cards (serialNumber, authtoken, writeKey, readKey, owner) VALUES (?, ?, ?, ?, 0)",
    )
    .bind(serial_number)
    .bind(&authtoken)
    .bind(&write_key)
    .bind(&read_key)
    .execute(&mut *tx)
    .await;

    match inserted {
        Err(e) if is_unique_violation(&e) => {
            // The transaction carrying the failed insert is gone, so the
            // denial's audit row goes straight to the pool.
            tx.rollback().await?;
            audit::append(
                pool,
                &AccessLogEntry::new(Some(serial_number), Some(reader.id), None, false)
                    .with_comment("card insert failed"),
            )
            .await?;
            Ok(AddCardResponse::denied())
        }
        Err(e) => {
            tx.rollback().await?;
            Err(AppError::Database(e))
        }
        Ok(_) => {
            audit::append(
                &mut *tx,
                &AccessLogEntry::new(Some(serial_number), Some(reader.id), None, true)
                    .with_comment("card provisioned"),
            )
            .await?;
            tx.commit().await?;
            Ok(AddCardResponse {
                ok: true,
                authtoken,
                write_key,
                read_key,
            })
        }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Draw `len` random bytes from the OS and encode them unpadded.
///
/// A randomness failure is an error; a short or zeroed secret must never
/// reach storage.
fn generate_secret(len: usize) -> Result<String, AppError> {
    let mut buf = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| AppError::Random(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(buf))
}
