//! Session lifecycle: tracking the identity-service session, deriving the
//! user's identity, and logging out after a period of inactivity.

pub mod activity;
pub mod manager;
pub mod state;
pub mod timer;

pub use activity::{ActivityListeners, InteractionHub};
pub use manager::SessionLifecycleManager;
pub use state::AuthSnapshot;
pub use timer::InactivityTimer;
