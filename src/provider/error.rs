use thiserror::Error;

/// Machine-readable error codes the provider attaches to rejected requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    EmailNotConfirmed,
    InvalidCredentials,
    OverRequestRateLimit,
    OverEmailSendRateLimit,
    UserAlreadyExists,
    EmailExists,
    WeakPassword,
    EmailAddressInvalid,
    SignupDisabled,
    SessionNotFound,
    RefreshTokenNotFound,
    RefreshTokenAlreadyUsed,
    BadJwt,
    OtpExpired,
}

impl ErrorCode {
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        let code = match code {
            "email_not_confirmed" => Self::EmailNotConfirmed,
            "invalid_credentials" => Self::InvalidCredentials,
            "over_request_rate_limit" => Self::OverRequestRateLimit,
            "over_email_send_rate_limit" => Self::OverEmailSendRateLimit,
            "user_already_exists" => Self::UserAlreadyExists,
            "email_exists" => Self::EmailExists,
            "weak_password" => Self::WeakPassword,
            "email_address_invalid" => Self::EmailAddressInvalid,
            "signup_disabled" | "email_provider_disabled" => Self::SignupDisabled,
            "session_not_found" => Self::SessionNotFound,
            "refresh_token_not_found" => Self::RefreshTokenNotFound,
            "refresh_token_already_used" => Self::RefreshTokenAlreadyUsed,
            "bad_jwt" => Self::BadJwt,
            "otp_expired" => Self::OtpExpired,
            _ => return None,
        };
        Some(code)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmailNotConfirmed => "email_not_confirmed",
            Self::InvalidCredentials => "invalid_credentials",
            Self::OverRequestRateLimit => "over_request_rate_limit",
            Self::OverEmailSendRateLimit => "over_email_send_rate_limit",
            Self::UserAlreadyExists => "user_already_exists",
            Self::EmailExists => "email_exists",
            Self::WeakPassword => "weak_password",
            Self::EmailAddressInvalid => "email_address_invalid",
            Self::SignupDisabled => "signup_disabled",
            Self::SessionNotFound => "session_not_found",
            Self::RefreshTokenNotFound => "refresh_token_not_found",
            Self::RefreshTokenAlreadyUsed => "refresh_token_already_used",
            Self::BadJwt => "bad_jwt",
            Self::OtpExpired => "otp_expired",
        }
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider rejected request ({status}): {message}")]
    Api {
        status: u16,
        code: Option<ErrorCode>,
        message: String,
    },
    #[error("provider transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid provider response: {0}")]
    Decode(String),
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    #[must_use]
    pub fn api(status: u16, code: Option<ErrorCode>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api { code, .. } => *code,
            _ => None,
        }
    }

    /// Provider wording, used as a fallback when no code is available.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// The provider looked at the credentials and refused them, as opposed to
    /// being unreachable or answering garbage.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Api { status, .. } if (400..500).contains(status))
    }
}
