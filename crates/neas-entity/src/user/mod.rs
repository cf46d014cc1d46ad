//! Profile and derived-identity entities.

pub mod identity;
pub mod profile;

pub use identity::{DEFAULT_ROLE, DerivedIdentity};
pub use profile::{ProfileRow, RoleRef};
