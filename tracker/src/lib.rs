//! Calorie Tracker
//!
//! Layer around the pure nutrition engine:
//! - Config: layered configuration (defaults, TOML file, environment)
//! - Session: explicit per-user state with memoized summaries
//! - Report: dashboard bundle and terminal rendering
//! - Export: CSV and JSON period exports

pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod report;
pub mod session;

pub use error::{TrackerError, TrackerResult};
pub use session::{LogOutcome, SessionContext, SessionSnapshot, UserIdentity};
