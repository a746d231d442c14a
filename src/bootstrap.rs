//! Startup wiring
//!
//! Builds the configured storage and credential adapters, creates the
//! session manager and runs the startup restore.

use std::sync::Arc;

use tracing::info;

use crate::application::{SessionManager, SharedSessionManager};
use crate::config::{AppConfig, AuthProvider, LogFormat, LoggingConfig, StorageBackend};
use crate::domain::{BootstrapError, SharedStore, SharedVerifier};
use crate::infrastructure::{DirectoryVerifier, FileStore, MemoryStore, MockVerifier};

/// Install the global tracing subscriber. `RUST_LOG` wins over the config.
pub fn init_tracing(config: &LoggingConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

pub async fn build_store(config: &AppConfig) -> Result<SharedStore, BootstrapError> {
    let store: SharedStore = match config.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::File => Arc::new(FileStore::open(&config.storage.path).await?),
    };
    Ok(store)
}

pub fn build_verifier(config: &AppConfig) -> SharedVerifier {
    match config.auth.provider {
        AuthProvider::Mock => Arc::new(MockVerifier::new(
            config.auth.mock.admin_email.clone(),
            config.auth.mock.delay(),
        )),
        AuthProvider::Directory => Arc::new(DirectoryVerifier::new(
            config.auth.accounts.iter().map(|a| a.to_account()),
        )),
    }
}

/// Create a session manager from config and restore any saved session.
pub async fn start_session(config: &AppConfig) -> Result<SharedSessionManager, BootstrapError> {
    config.validate()?;

    let store = build_store(config).await?;
    let verifier = build_verifier(config);
    info!(
        storage = ?config.storage.backend,
        provider = ?config.auth.provider,
        "Starting session manager"
    );

    let manager = SessionManager::shared(store, verifier, config.session_options());
    manager.restore().await;
    Ok(manager)
}
