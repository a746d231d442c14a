//! Application configuration
//!
//! Loaded from a TOML file (default `~/.config/society-session/config.toml`).
//! Every section is optional; missing values fall back to defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::session::manager::DEFAULT_SESSION_KEY;
use crate::application::SessionOptions;
use crate::domain::{ConfigError, User, UserRole};
use crate::infrastructure::auth::{DirectoryAccount, DEFAULT_ADMIN_EMAIL};
use crate::infrastructure::crypto::password::is_bcrypt_hash;

const APP_DIR: &str = "society-session";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "SOCIETY_SESSION_CONFIG";

/// Default config file path: `<config_dir>/society-session/config.toml`.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

/// Default directory for the file store.
pub fn default_data_dir() -> PathBuf {
    dirs_next::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

// ── Logging ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` env-filter directive, e.g. `info` or `society_session=debug`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
        }
    }
}

// ── Storage ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Root directory for the file backend.
    pub path: PathBuf,
    /// Key holding the persisted session.
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            path: default_data_dir(),
            key: DEFAULT_SESSION_KEY.into(),
        }
    }
}

// ── Auth ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    #[default]
    Mock,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub provider: AuthProvider,
    /// Seconds before a login attempt is abandoned. 0 disables the limit.
    pub login_timeout_secs: u64,
    pub mock: MockAuthConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<AccountConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            provider: AuthProvider::Mock,
            login_timeout_secs: 30,
            mock: MockAuthConfig::default(),
            accounts: Vec::new(),
        }
    }
}

impl AuthConfig {
    pub fn login_timeout(&self) -> Option<Duration> {
        (self.login_timeout_secs > 0).then(|| Duration::from_secs(self.login_timeout_secs))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockAuthConfig {
    pub admin_email: String,
    pub delay_ms: u64,
}

impl Default for MockAuthConfig {
    fn default() -> Self {
        Self {
            admin_email: DEFAULT_ADMIN_EMAIL.into(),
            delay_ms: 1000,
        }
    }
}

impl MockAuthConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// One `[[auth.accounts]]` entry for the directory provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AccountConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[validate(email)]
    pub email: String,
    /// bcrypt hash, see `society-session hash-password`.
    pub password_hash: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flat_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Account creation time. Defaults to the Unix epoch when not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl AccountConfig {
    /// Configured id, or one derived from the lowercased email so it is the
    /// same on every load.
    pub fn user_id(&self) -> String {
        self.id.clone().unwrap_or_else(|| {
            uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, self.email.to_lowercase().as_bytes())
                .to_string()
        })
    }

    pub fn to_account(&self) -> DirectoryAccount {
        DirectoryAccount {
            user: User {
                id: self.user_id(),
                email: self.email.clone(),
                name: self.name.clone(),
                role: self.role,
                flat_number: self.flat_number.clone(),
                phone_number: self.phone_number.clone(),
                profile_picture: None,
                created_at: self.created_at.unwrap_or_default(),
                is_active: self.active,
            },
            password_hash: self.password_hash.clone(),
        }
    }
}

// ── Load / save ─────────────────────────────────────────────────

impl AppConfig {
    /// Read and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    /// A file that exists and fails to parse or validate is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.key.is_empty() {
            return Err(ConfigError::Invalid("storage.key must not be empty".into()));
        }
        if self.auth.provider == AuthProvider::Directory && self.auth.accounts.is_empty() {
            return Err(ConfigError::Invalid(
                "auth.provider = \"directory\" requires at least one [[auth.accounts]] entry"
                    .into(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for account in &self.auth.accounts {
            account
                .validate()
                .map_err(|e| ConfigError::Invalid(format!("account {}: {}", account.email, e)))?;
            if !is_bcrypt_hash(&account.password_hash) {
                return Err(ConfigError::Invalid(format!(
                    "account {}: password_hash is not a bcrypt hash",
                    account.email
                )));
            }
            account
                .to_account()
                .user
                .validate()
                .map_err(|e| ConfigError::Invalid(format!("account {}: {}", account.email, e)))?;
            if !seen.insert(account.email.to_lowercase()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate account email {}",
                    account.email
                )));
            }
        }
        Ok(())
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            storage_key: self.storage.key.clone(),
            login_timeout: self.auth.login_timeout(),
        }
    }
}
