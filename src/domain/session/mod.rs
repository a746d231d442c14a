//! Session state and its persisted form

pub mod record;
pub mod state;

pub use record::{decode_record, encode_record, PersistedSession, RECORD_VERSION};
pub use state::{Screen, SessionPhase, SessionState};
