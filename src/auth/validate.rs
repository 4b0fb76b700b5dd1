use std::sync::OnceLock;

use regex::Regex;

use crate::error::AppError;

/// Shape checks performed locally, before any database or mailer work.
/// Mirrors what the registration and reset forms enforce client-side.

const MIN_PASSWORD_LEN: usize = 8;
const MIN_NAME_LEN: usize = 2;

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

pub fn email(value: &str) -> Result<(), AppError> {
    if email_re().is_match(value.trim()) {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Please enter a valid email address".to_string(),
        ))
    }
}

pub fn password(value: &str) -> Result<(), AppError> {
    if value.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn name(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().len() < MIN_NAME_LEN {
        return Err(AppError::Validation(format!(
            "{field} must be at least {MIN_NAME_LEN} characters"
        )));
    }
    Ok(())
}

pub fn passwords_match(password: &str, confirmation: &str) -> Result<(), AppError> {
    if password != confirmation {
        return Err(AppError::Validation("Passwords don't match".to_string()));
    }
    Ok(())
}
