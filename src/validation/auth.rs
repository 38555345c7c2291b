use crate::error::{AppError, Result};

/// The maximum accepted email length (RFC 5321 mailbox limit).
const MAX_EMAIL_LEN: usize = 254;
/// The maximum accepted password length.
const MAX_PASSWORD_LEN: usize = 256;

/// Normalizes an email address for authentication (trim + lowercase).
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates login credentials after normalization.
///
/// Oversized values get the same generic message as a failed login so the
/// response never hints at which part was wrong.
pub fn validate_credentials(email: &str, password: &str) -> Result<()> {
    if email.is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    if email.len() > MAX_EMAIL_LEN || password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::Validation("Invalid credentials".to_string()));
    }

    Ok(())
}

/// Validates a signup payload.
pub fn validate_signup(email: &str, password: &str, password_confirm: &str) -> Result<()> {
    if email.is_empty() || password.is_empty() || password_confirm.is_empty() {
        return Err(AppError::Validation(
            "Email, password, and password confirmation are required".to_string(),
        ));
    }

    if password != password_confirm {
        return Err(AppError::Validation("Passwords do not match".to_string()));
    }

    Ok(())
}
