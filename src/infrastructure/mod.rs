//! Infrastructure layer - storage and credential adapters

pub mod auth;
pub mod crypto;
pub mod storage;

pub use auth::{DirectoryAccount, DirectoryVerifier, MockVerifier};
pub use storage::{FileStore, MemoryStore};
