//! Provider errors mapped to the categories shown to users.
//!
//! The structured error code decides when the provider sends one. Otherwise
//! the provider's wording is matched case-insensitively, which breaks
//! whenever the provider rephrases a message.

use crate::provider::{ErrorCode, ProviderError};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("Please confirm your email first. A confirmation link has been sent to your inbox.")]
    EmailNotConfirmed,
    #[error("Wrong email or password.")]
    InvalidCredentials,
    #[error("Too many requests. Please wait a few minutes and try again.")]
    RateLimited,
    #[error("This email is already registered. Please sign in.")]
    AlreadyRegistered,
    #[error("Password must be at least 6 characters.")]
    WeakPassword,
    #[error("Email format is not valid.")]
    InvalidEmail,
    #[error("Sign up is currently disabled.")]
    SignupDisabled,
    #[error("Login failed. Please try again.")]
    LoginFailed,
    #[error("Sign up failed. Please try again.")]
    SignupFailed,
}

const EMAIL_NOT_CONFIRMED: &[&str] = &[
    "email not confirmed",
    "email_not_confirmed",
    "email_not_verified",
    "email confirmation",
];
const INVALID_CREDENTIALS: &[&str] = &[
    "invalid login credentials",
    "invalid_credentials",
    "invalid password",
    "wrong password",
];
const RATE_LIMITED: &[&str] = &["rate limit exceeded", "too many requests"];
const ALREADY_REGISTERED: &[&str] = &["already registered", "already exists"];
const WEAK_PASSWORD: &[&str] = &["password should be at least"];
const INVALID_EMAIL: &[&str] = &["invalid email"];
const SIGNUP_DISABLED: &[&str] = &["signup is disabled", "signups not allowed"];

fn mentions(message: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| message.contains(needle))
}

#[must_use]
pub fn classify_login(err: &ProviderError) -> AuthFailure {
    match err.code() {
        Some(ErrorCode::EmailNotConfirmed) => return AuthFailure::EmailNotConfirmed,
        Some(ErrorCode::InvalidCredentials) => return AuthFailure::InvalidCredentials,
        Some(ErrorCode::OverRequestRateLimit | ErrorCode::OverEmailSendRateLimit) => {
            return AuthFailure::RateLimited
        }
        _ => {}
    }

    let message = err.message().to_lowercase();
    if mentions(&message, EMAIL_NOT_CONFIRMED) {
        AuthFailure::EmailNotConfirmed
    } else if mentions(&message, INVALID_CREDENTIALS) {
        AuthFailure::InvalidCredentials
    } else if mentions(&message, RATE_LIMITED) {
        AuthFailure::RateLimited
    } else {
        AuthFailure::LoginFailed
    }
}

#[must_use]
pub fn classify_signup(err: &ProviderError) -> AuthFailure {
    match err.code() {
        Some(ErrorCode::UserAlreadyExists | ErrorCode::EmailExists) => {
            return AuthFailure::AlreadyRegistered
        }
        Some(ErrorCode::WeakPassword) => return AuthFailure::WeakPassword,
        Some(ErrorCode::EmailAddressInvalid) => return AuthFailure::InvalidEmail,
        Some(ErrorCode::OverRequestRateLimit | ErrorCode::OverEmailSendRateLimit) => {
            return AuthFailure::RateLimited
        }
        Some(ErrorCode::SignupDisabled) => return AuthFailure::SignupDisabled,
        _ => {}
    }

    let message = err.message().to_lowercase();
    if mentions(&message, ALREADY_REGISTERED) {
        AuthFailure::AlreadyRegistered
    } else if mentions(&message, WEAK_PASSWORD) {
        AuthFailure::WeakPassword
    } else if mentions(&message, INVALID_EMAIL) {
        AuthFailure::InvalidEmail
    } else if mentions(&message, RATE_LIMITED) {
        AuthFailure::RateLimited
    } else if mentions(&message, SIGNUP_DISABLED) {
        AuthFailure::SignupDisabled
    } else {
        AuthFailure::SignupFailed
    }
}
