use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{AuthenticationError, User};

/// Pluggable credential verification.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, email: &str, password: &str) -> Result<User, AuthenticationError>;
}

pub type SharedVerifier = Arc<dyn CredentialVerifier>;
