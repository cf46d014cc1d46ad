//! Password policy enforcement and the forgot/reset password flow.

pub mod reset;
pub mod validator;

pub use self::reset::{ForgotPasswordForm, PasswordResetFlow};
pub use self::validator::PasswordValidator;
