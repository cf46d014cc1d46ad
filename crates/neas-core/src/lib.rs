//! # neas-core
//!
//! Core crate for the NEAS administration console. Contains configuration
//! schemas, typed identifiers, session and interaction events, the listener
//! registry used by every event source, and the unified error system.
//!
//! This crate has **no** internal dependencies on other NEAS crates.

pub mod config;
pub mod error;
pub mod events;
pub mod listener;
pub mod result;
pub mod types;

pub use error::AppError;
pub use listener::{ListenerId, ListenerRegistry, Subscription};
pub use result::AppResult;
