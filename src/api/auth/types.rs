use crate::provider::SessionUpdate;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Login form fields. Empty values count as missing.
#[derive(ToSchema, Deserialize, Default, Clone)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
    /// Path to return to after a successful login.
    pub next: Option<String>,
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("next", &self.next)
            .finish()
    }
}

#[derive(ToSchema, Deserialize, Default, Clone)]
pub struct SignupForm {
    pub fullname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for SignupForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupForm")
            .field("fullname", &self.fullname)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// What the page learns from an auth action.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ActionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl ActionResult {
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            redirect: None,
        }
    }

    #[must_use]
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            redirect: None,
        }
    }

    #[must_use]
    pub fn redirect(to: impl Into<String>) -> Self {
        Self {
            success: true,
            message: None,
            redirect: Some(to.into()),
        }
    }
}

/// Action result plus the cookie update the HTTP layer has to apply.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub result: ActionResult,
    pub session: SessionUpdate,
}

impl ActionOutcome {
    pub(crate) fn failure(message: impl Into<String>) -> Self {
        Self {
            result: ActionResult::failure(message),
            session: SessionUpdate::Unchanged,
        }
    }
}
