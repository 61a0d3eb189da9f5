//! Data shapes exchanged with the identity provider.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Profile fields stored by the provider alongside the account.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl UserMetadata {
    /// Metadata written at signup: both fields carry the display name.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            full_name: Some(name.to_string()),
            display_name: Some(name.to_string()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    /// RFC 3339 timestamp; `None` while the email is unconfirmed.
    #[serde(default)]
    pub email_confirmed_at: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

impl User {
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.email_confirmed_at
            .as_deref()
            .is_some_and(|at| !at.is_empty())
    }
}

/// Provider-issued credential pair.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: u64,
    pub user: User,
}

/// Identity assertions derived from a valid session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: Uuid,
    pub email: Option<String>,
    pub email_confirmed_at: Option<String>,
    pub metadata: UserMetadata,
}

impl From<&User> for Claims {
    fn from(user: &User) -> Self {
        Self {
            sub: user.id,
            email: user.email.clone(),
            email_confirmed_at: user.email_confirmed_at.clone(),
            metadata: user.user_metadata.clone(),
        }
    }
}

/// Raw token values read from the request cookies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl SessionTokens {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

impl From<&Session> for SessionTokens {
    fn from(session: &Session) -> Self {
        Self {
            access_token: Some(session.access_token.clone()),
            refresh_token: Some(session.refresh_token.clone()),
        }
    }
}

/// What must happen to the client's session cookies after a provider call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionUpdate {
    #[default]
    Unchanged,
    Refreshed(Session),
    Cleared,
}

impl SessionUpdate {
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

/// Result of refreshing a session: the claims (if any) plus the cookie update.
#[derive(Debug, Clone, Default)]
pub struct ClaimsRefresh {
    pub claims: Option<Claims>,
    pub session: SessionUpdate,
}

impl ClaimsRefresh {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignIn {
    pub user: Option<User>,
    pub session: Option<Session>,
}

#[derive(Debug, Clone, Default)]
pub struct SignUp {
    pub user: Option<User>,
    pub session: Option<Session>,
}

#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub email: String,
    pub password: SecretString,
    pub metadata: UserMetadata,
    pub redirect_to: String,
}

/// One-time-password flavours accepted by the confirmation callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpKind {
    Signup,
    Email,
    Recovery,
    Invite,
    MagicLink,
    EmailChange,
}

impl OtpKind {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "signup" => Some(Self::Signup),
            "email" => Some(Self::Email),
            "recovery" => Some(Self::Recovery),
            "invite" => Some(Self::Invite),
            "magiclink" => Some(Self::MagicLink),
            "email_change" => Some(Self::EmailChange),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Signup => "signup",
            Self::Email => "email",
            Self::Recovery => "recovery",
            Self::Invite => "invite",
            Self::MagicLink => "magiclink",
            Self::EmailChange => "email_change",
        }
    }
}
