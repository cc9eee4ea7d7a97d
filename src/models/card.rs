//! Card secrets and the reader-facing API request/response types.
//!
//! A card carries one public identifier (its serial number) and three
//! secrets: the authtoken proving physical possession, and the read/write
//! keys handed to readers on demand.
//!
//! Request field names are all lowercase; that is the wire format the
//! deployed reader firmware sends. Response fields follow the documented
//! contract (`writeKey`/`readKey` in camelCase).

use serde::{Deserialize, Serialize};

/// The per-card secrets issued to readers, fetched by serial number.
#[derive(Debug, sqlx::FromRow)]
pub struct CardKeys {
    #[sqlx(rename = "writeKey")]
    pub write_key: String,

    #[sqlx(rename = "readKey")]
    pub read_key: String,
}

/// Request body for `POST /api/request/verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(rename = "apikey")]
    pub api_key: String,

    /// Secret bound to the physical card, proving possession
    pub authtoken: String,

    #[serde(rename = "serialnumber")]
    pub serial_number: String,
}

/// Response body for `POST /api/request/verify`.
///
/// Denials carry empty strings; the HTTP status is 200 either way.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub ok: bool,
    pub name: String,
    pub permission: String,
}

impl VerifyResponse {
    pub fn denied() -> Self {
        Self {
            ok: false,
            name: String::new(),
            permission: String::new(),
        }
    }
}

/// Request body for `POST /api/request/key`.
#[derive(Debug, Deserialize)]
pub struct KeyRequest {
    #[serde(rename = "apikey")]
    pub api_key: String,

    #[serde(rename = "serialnumber")]
    pub serial_number: String,

    /// `true` asks for the write key, which needs the writeCard permission
    #[serde(default)]
    pub write: bool,
}

/// Response body for `POST /api/request/key`.
#[derive(Debug, Serialize)]
pub struct KeyResponse {
    pub ok: bool,
    pub key: String,
}

impl KeyResponse {
    pub fn denied() -> Self {
        Self {
            ok: false,
            key: String::new(),
        }
    }
}

/// Request body for `POST /api/request/addCard`.
#[derive(Debug, Deserialize)]
pub struct AddCardRequest {
    #[serde(rename = "apikey")]
    pub api_key: String,

    #[serde(rename = "serialnumber")]
    pub serial_number: String,
}

/// Response body for `POST /api/request/addCard`.
///
/// On success this is the one and only disclosure of the authtoken.
#[derive(Debug, Serialize)]
pub struct AddCardResponse {
    pub ok: bool,
    pub authtoken: String,

    #[serde(rename = "writeKey")]
    pub write_key: String,

    #[serde(rename = "readKey")]
    pub read_key: String,
}

impl AddCardResponse {
    pub fn denied() -> Self {
        Self {
            ok: false,
            authtoken: String::new(),
            write_key: String::new(),
            read_key: String::new(),
        }
    }
}
