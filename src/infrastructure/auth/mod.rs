//! Credential verifier adapters

mod directory;
mod mock;

pub use directory::{DirectoryAccount, DirectoryVerifier};
pub use mock::{mock_administrator, mock_resident, MockVerifier, DEFAULT_ADMIN_EMAIL};
