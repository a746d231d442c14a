//! Domain ports (hexagonal architecture boundaries)
//!
//! Ports define the interfaces between the session core and the outside
//! world. Storage and credential checking are swappable adapters behind them.

pub mod credentials;
pub mod storage;

pub use credentials::{CredentialVerifier, SharedVerifier};
pub use storage::{KeyValueStore, SharedStore};
