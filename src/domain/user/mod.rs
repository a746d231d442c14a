//! User aggregate
//!
//! Identity record carried by an authenticated session.

pub mod model;

pub use model::{User, UserRole};
