//! Password hashing utilities

use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    hash(password, DEFAULT_COST)
}

/// Hash with an explicit cost. Tests use the minimum to stay fast.
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, BcryptError> {
    hash(password, cost)
}

/// Verify a password against a hash. A hash bcrypt cannot parse never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    verify(password, hash).unwrap_or(false)
}

/// Whether `value` looks like a bcrypt hash (`$2a$`, `$2b$`, `$2x$` or `$2y$`).
pub fn is_bcrypt_hash(value: &str) -> bool {
    value.len() == 60
        && ["$2a$", "$2b$", "$2x$", "$2y$"]
            .iter()
            .any(|prefix| value.starts_with(prefix))
}
