pub mod session;

pub use session::{LoginOutcome, SessionManager, SessionOptions, SharedSessionManager};
