//! Events observed and emitted by the session core.
//!
//! Interaction events come from the UI and reset the inactivity deadline;
//! session notices go the other way and tell the UI what the manager did.

pub mod interaction;
pub mod session;

pub use interaction::InteractionKind;
pub use session::SessionNotice;
