//! Persisted session record
//!
//! Stored under a single key as a versioned JSON envelope:
//! `{"version":1,"savedAt":"...","user":{...}}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{SessionRestoreError, User};

/// Current record schema version.
pub const RECORD_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub user: User,
}

/// Serialize a user into a record for the session storage slot.
pub fn encode_record(user: &User) -> Result<String, serde_json::Error> {
    serde_json::to_string(&PersistedSession {
        version: RECORD_VERSION,
        saved_at: Utc::now(),
        user: user.clone(),
    })
}

/// Parse a stored record back into a user.
///
/// The version is checked before the user body so a future record shape
/// reports as unsupported rather than as malformed.
pub fn decode_record(raw: &str) -> Result<User, SessionRestoreError> {
    #[derive(Deserialize)]
    struct Header {
        version: u32,
    }

    let header: Header = serde_json::from_str(raw)?;
    if header.version != RECORD_VERSION {
        return Err(SessionRestoreError::UnsupportedVersion {
            found: header.version,
            expected: RECORD_VERSION,
        });
    }

    let record: PersistedSession = serde_json::from_str(raw)?;
    record
        .user
        .validate()
        .map_err(SessionRestoreError::InvalidUser)?;
    Ok(record.user)
}
