pub mod manager;

pub use manager::{LoginOutcome, SessionManager, SessionOptions, SharedSessionManager};
