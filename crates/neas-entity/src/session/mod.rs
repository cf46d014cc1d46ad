//! Session domain entities.

pub mod change;
pub mod model;

pub use change::{SessionChange, SessionChangeKind};
pub use model::{AuthUser, Session};
