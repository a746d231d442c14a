//! Account-directory verifier
//!
//! Checks credentials against a fixed list of accounts with bcrypt password
//! hashes, typically loaded from `[[auth.accounts]]` in the config file.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{AuthenticationError, CredentialVerifier, User};
use crate::infrastructure::crypto::password::{hash_password_with_cost, verify_password};

const DUMMY_PASSWORD: &str = "society-session-unknown-account";

#[derive(Debug, Clone)]
pub struct DirectoryAccount {
    pub user: User,
    pub password_hash: String,
}

/// Verifier over an in-memory account list. Email lookup ignores case.
///
/// An unknown email is checked against a dummy hash of the same cost as the
/// configured accounts, so a miss costs as much as a wrong password.
pub struct DirectoryVerifier {
    accounts: HashMap<String, DirectoryAccount>,
    dummy_hash: Option<String>,
}

impl DirectoryVerifier {
    pub fn new(accounts: impl IntoIterator<Item = DirectoryAccount>) -> Self {
        let accounts: HashMap<String, DirectoryAccount> = accounts
            .into_iter()
            .map(|account| (account.user.email.to_lowercase(), account))
            .collect();
        let cost = accounts
            .values()
            .filter_map(|account| hash_cost(&account.password_hash))
            .max()
            .unwrap_or(bcrypt::DEFAULT_COST);
        let dummy_hash = hash_password_with_cost(DUMMY_PASSWORD, cost).ok();
        Self {
            accounts,
            dummy_hash,
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl CredentialVerifier for DirectoryVerifier {
    async fn verify(&self, email: &str, password: &str) -> Result<User, AuthenticationError> {
        let account = self.accounts.get(&email.to_lowercase());
        let hash = account
            .map(|account| account.password_hash.clone())
            .or_else(|| self.dummy_hash.clone());

        let valid = match hash {
            Some(hash) => {
                let password = password.to_string();
                tokio::task::spawn_blocking(move || verify_password(&password, &hash))
                    .await
                    .map_err(|e| AuthenticationError::Unavailable(e.to_string()))?
            }
            None => false,
        };

        let Some(account) = account else {
            debug!(email, "no such account");
            return Err(AuthenticationError::InvalidCredentials);
        };
        if !valid {
            return Err(AuthenticationError::InvalidCredentials);
        }
        if !account.user.is_active {
            return Err(AuthenticationError::AccountDisabled);
        }
        Ok(account.user.clone())
    }
}

/// Cost field of a `$2b$NN$...` hash.
fn hash_cost(hash: &str) -> Option<u32> {
    hash.get(4..6)?.parse().ok()
}
