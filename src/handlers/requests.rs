//! Reader-facing API endpoints.
//!
//! This module implements the endpoints door controllers call:
//! - POST /api/request/verify - Should this card unlock the door
//! - POST /api/request/key - Hand out a card's read or write key
//! - POST /api/request/addCard - Provision a brand-new card
//!
//! Every *decision* is an HTTP 200 with an `ok` flag; denials carry empty
//! string fields. HTTP error statuses are reserved for requests that never
//! became a decision: a non-JSON content type (415, no body) or broken
//! storage (500 envelope).

use axum::{
    Json,
    extract::State,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::AppError;
use crate::models::card::{
    AddCardRequest, AddCardResponse, KeyRequest, KeyResponse, VerifyRequest, VerifyResponse,
};
use crate::services::{provision_service, verify_service};
use crate::state::AppState;

/// Split a JSON extractor rejection into the two cases the wire contract
/// distinguishes: a non-JSON content type is refused outright, while a
/// body that failed to parse still gets a denial envelope. No audit row
/// is written for either; nothing was identified yet.
fn rejection_response<T: Serialize>(rejection: JsonRejection, denied: T) -> Response {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response()
        }
        _ => Json(denied).into_response(),
    }
}

/// Verify a card presented at a reader.
///
/// # Request Body
///
/// ```json
/// {
///   "apikey": "reader-secret",
///   "authtoken": "card-secret",
///   "serialnumber": "S1"
/// }
/// ```
///
/// # Response (200)
///
/// ```json
/// { "ok": true, "name": "Alice", "permission": "staff" }
/// ```
pub async fn verify(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return Ok(rejection_response(rejection, VerifyResponse::denied())),
    };

    let response = verify_service::verify_card(
        &state.pool,
        &request.api_key,
        &request.authtoken,
        &request.serial_number,
    )
    .await?;

    Ok(Json(response).into_response())
}

/// Hand out a card's read or write key.
///
/// # Request Body
///
/// ```json
/// { "apikey": "reader-secret", "serialnumber": "S1", "write": true }
/// ```
///
/// # Response (200)
///
/// ```json
/// { "ok": true, "key": "..." }
/// ```
pub async fn issue_key(
    State(state): State<AppState>,
    payload: Result<Json<KeyRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return Ok(rejection_response(rejection, KeyResponse::denied())),
    };

    let response = provision_service::issue_key(
        &state.pool,
        &request.api_key,
        &request.serial_number,
        request.write,
    )
    .await?;

    Ok(Json(response).into_response())
}

/// Provision a brand-new card for the given serial number.
///
/// On success the response carries the card's three freshly generated
/// secrets; the authtoken is never shown again after this.
pub async fn add_card(
    State(state): State<AppState>,
    payload: Result<Json<AddCardRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return Ok(rejection_response(rejection, AddCardResponse::denied())),
    };

    let response =
        provision_service::add_card(&state.pool, &request.api_key, &request.serial_number).await?;

    Ok(Json(response).into_response())
}
