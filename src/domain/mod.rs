//! Domain layer: identity, session state and the ports around them

pub mod error;
pub mod ports;
pub mod session;
pub mod user;

pub use error::{
    AuthenticationError, BootstrapError, ConfigError, LoginError, SessionRestoreError,
    StorageError,
};
pub use ports::{CredentialVerifier, KeyValueStore, SharedStore, SharedVerifier};
pub use session::{Screen, SessionPhase, SessionState};
pub use user::{User, UserRole};
