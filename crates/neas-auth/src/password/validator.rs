//! Password policy enforcement for new passwords.

use zxcvbn::Score;

use neas_core::config::AuthConfig;
use neas_core::error::AppError;

/// Validates password strength against configured policies.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length.
    min_length: usize,
    /// Minimum zxcvbn score.
    min_score: Score,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            min_score: score_from(config.password_min_strength),
        }
    }

    /// Validates a password against all configured policies.
    ///
    /// Returns `Ok(())` if the password meets all requirements,
    /// or an error describing the first violation found.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if !password.chars().any(char::is_alphabetic) {
            return Err(AppError::validation(
                "Password must contain at least one letter",
            ));
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::validation(
                "Password must contain at least one digit",
            ));
        }

        let estimate = zxcvbn::zxcvbn(password, &[]);
        if estimate.score() < self.min_score {
            return Err(AppError::validation(
                "Password is too weak. Please use a stronger password with more entropy.",
            ));
        }

        Ok(())
    }

    /// Validates that the confirmation matches the new password.
    pub fn validate_confirmation(
        &self,
        password: &str,
        confirmation: &str,
    ) -> Result<(), AppError> {
        if password != confirmation {
            return Err(AppError::validation("Passwords do not match"));
        }
        Ok(())
    }
}

fn score_from(level: u8) -> Score {
    match level {
        0 => Score::Zero,
        1 => Score::One,
        2 => Score::Two,
        3 => Score::Three,
        _ => Score::Four,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> PasswordValidator {
        PasswordValidator::new(&AuthConfig::default())
    }

    #[test]
    fn test_accepts_strong_password() {
        assert!(validator().validate("Kibaha#Mtihani2031").is_ok());
    }

    #[test]
    fn test_rejects_short_password() {
        let err = validator().validate("ab1").unwrap_err();
        assert!(err.message.contains("at least 8"));
    }

    #[test]
    fn test_rejects_missing_digit() {
        let err = validator().validate("OnlyLettersHere").unwrap_err();
        assert!(err.message.contains("digit"));
    }

    #[test]
    fn test_rejects_common_password() {
        let err = validator().validate("password1").unwrap_err();
        assert!(err.message.contains("too weak"));
    }

    #[test]
    fn test_confirmation_mismatch() {
        assert!(
            validator()
                .validate_confirmation("Kibaha#Mtihani2031", "Kibaha#Mtihani2032")
                .is_err()
        );
    }
}
