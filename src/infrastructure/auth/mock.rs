//! Placeholder verifier
//!
//! Accepts any credentials. The administrator address resolves to the
//! administrator identity, every other address to the demo resident. The
//! delay stands in for the round trip to a real authentication service.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::domain::{AuthenticationError, CredentialVerifier, User, UserRole};

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@society.com";

pub fn mock_administrator() -> User {
    User {
        id: "1".into(),
        email: DEFAULT_ADMIN_EMAIL.into(),
        name: "Admin User".into(),
        role: UserRole::Administrator,
        flat_number: None,
        phone_number: Some("+1234567890".into()),
        profile_picture: None,
        created_at: Utc::now(),
        is_active: true,
    }
}

pub fn mock_resident() -> User {
    User {
        id: "2".into(),
        email: "resident@society.com".into(),
        name: "John Doe".into(),
        role: UserRole::Resident,
        flat_number: Some("A-101".into()),
        phone_number: Some("+1234567891".into()),
        profile_picture: None,
        created_at: Utc::now(),
        is_active: true,
    }
}

#[derive(Debug, Clone)]
pub struct MockVerifier {
    admin_email: String,
    delay: Duration,
}

impl MockVerifier {
    pub fn new(admin_email: impl Into<String>, delay: Duration) -> Self {
        Self {
            admin_email: admin_email.into(),
            delay,
        }
    }

    /// No simulated delay.
    pub fn instant() -> Self {
        Self::new(DEFAULT_ADMIN_EMAIL, Duration::ZERO)
    }
}

impl Default for MockVerifier {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_EMAIL, Duration::from_millis(1000))
    }
}

#[async_trait]
impl CredentialVerifier for MockVerifier {
    async fn verify(&self, email: &str, _password: &str) -> Result<User, AuthenticationError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let user = if email == self.admin_email {
            let mut admin = mock_administrator();
            admin.email = self.admin_email.clone();
            admin
        } else {
            mock_resident()
        };
        debug!(email, role = %user.role, "mock verifier resolved identity");
        Ok(user)
    }
}
