//! # Society Session
//!
//! Session and authentication state for the society management dashboard.
//! One local session per process: restored from storage at startup, then
//! changed only by `login()` and `logout()`.
//!
//! ## Architecture
//!
//! - **domain**: `User`, session state, persisted record format, errors and
//!   the storage / credential ports
//! - **application**: the `SessionManager`
//! - **infrastructure**: storage and credential adapters
//! - **config** / **bootstrap**: TOML configuration and startup wiring

pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::{LoginOutcome, SessionManager, SessionOptions, SharedSessionManager};
pub use bootstrap::{init_tracing, start_session};
pub use config::{default_config_path, AppConfig};
pub use domain::{Screen, SessionPhase, SessionState, User, UserRole};
