//! Session error taxonomy
//!
//! Every failure degrades to the unauthenticated state with an inspectable
//! message; none of these errors is fatal to the process.

use std::time::Duration;

use thiserror::Error;

/// Failures of the key-value storage port.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// A persisted session record could not be read back.
#[derive(Debug, Error)]
pub enum SessionRestoreError {
    #[error("Stored session is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Unsupported session record version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Invalid user record: {0}")]
    InvalidUser(String),

    #[error("Failed to read stored session: {0}")]
    Storage(#[from] StorageError),
}

/// Credential rejection by a [`CredentialVerifier`](crate::domain::CredentialVerifier).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Authentication service unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a `login()` call.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    #[error("Login timed out after {0:?}")]
    Timeout(Duration),

    /// Credentials were accepted but the session could not be persisted.
    #[error("Failed to save session: {0}")]
    StorageWrite(#[source] StorageError),

    #[error("Failed to encode session record: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Session is still being restored")]
    NotReady,

    #[error("A user is already signed in")]
    AlreadyAuthenticated,
}

impl LoginError {
    /// Message recorded in the session state for this failure, if it changes state.
    pub fn state_message(&self) -> Option<&'static str> {
        match self {
            Self::Authentication(_) => Some(INVALID_CREDENTIALS),
            Self::Timeout(_) => Some(LOGIN_TIMED_OUT),
            Self::StorageWrite(_) | Self::Encode(_) => Some(SAVE_FAILED),
            Self::NotReady | Self::AlreadyAuthenticated => None,
        }
    }
}

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Errors raised while assembling a session manager from config.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub const RESTORE_FAILED: &str = "failed to load session";
pub const INVALID_CREDENTIALS: &str = "invalid credentials";
pub const LOGIN_TIMED_OUT: &str = "login timed out";
pub const SAVE_FAILED: &str = "failed to save session";
