//! Form validation. Rules run in order and the first failure wins.

use super::types::{LoginForm, SignupForm};
use regex::Regex;
use secrecy::SecretString;
use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 72;
pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 100;

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter your email and password.")]
    MissingCredentials,
    #[error("Please fill in all fields.")]
    MissingFields,
    #[error("Name must be at least 2 characters.")]
    NameTooShort,
    #[error("Name cannot be longer than 100 characters.")]
    NameTooLong,
    #[error("Email format is not valid.")]
    InvalidEmail,
    #[error("Password must be at least 6 characters.")]
    PasswordTooShort,
    #[error("Password cannot be longer than 72 characters.")]
    PasswordTooLong,
}

pub struct LoginCredentials {
    pub email: String,
    pub password: SecretString,
    pub next: Option<String>,
}

pub struct SignupDetails {
    pub fullname: String,
    pub email: String,
    pub password: SecretString,
}

pub fn valid_email(email: &str) -> bool {
    Regex::new(EMAIL_PATTERN).map_or(false, |re| re.is_match(email))
}

#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Accept `next` only as a same-site path; anything else lands on `/`.
#[must_use]
pub fn sanitize_next(next: Option<&str>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|value| !value.is_empty())
}

fn check_email(email: &str) -> Result<String, ValidationError> {
    let email = normalize_email(email);
    if valid_email(&email) {
        Ok(email)
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// # Errors
/// Returns the first rule the form breaks.
pub fn validate_login(form: &LoginForm) -> Result<LoginCredentials, ValidationError> {
    let (Some(email), Some(password)) = (
        present(form.email.as_ref()),
        present(form.password.as_ref()),
    ) else {
        return Err(ValidationError::MissingCredentials);
    };

    let email = check_email(email)?;

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }

    Ok(LoginCredentials {
        email,
        password: SecretString::from(password.to_string()),
        next: present(form.next.as_ref()).map(str::to_string),
    })
}

/// # Errors
/// Returns the first rule the form breaks.
pub fn validate_signup(form: &SignupForm) -> Result<SignupDetails, ValidationError> {
    let (Some(fullname), Some(email), Some(password)) = (
        present(form.fullname.as_ref()),
        present(form.email.as_ref()),
        present(form.password.as_ref()),
    ) else {
        return Err(ValidationError::MissingFields);
    };

    let fullname = fullname.trim();
    let name_length = fullname.chars().count();
    if name_length < MIN_NAME_LENGTH {
        return Err(ValidationError::NameTooShort);
    }
    if name_length > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong);
    }

    let email = check_email(email)?;

    let password_length = password.chars().count();
    if password_length < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    if password_length > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooLong);
    }

    Ok(SignupDetails {
        fullname: fullname.to_string(),
        email,
        password: SecretString::from(password.to_string()),
    })
}
