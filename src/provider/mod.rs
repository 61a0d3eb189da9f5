//! Identity provider seam.
//!
//! Everything that touches credentials or session tokens goes through
//! [`IdentityProvider`]. The HTTP implementation talks to the hosted provider;
//! the in-memory one backs local development and the test suites.

mod error;
pub mod gotrue;
pub mod memory;
mod types;

pub use error::{ErrorCode, ProviderError};
pub use gotrue::GoTrueProvider;
pub use memory::MemoryProvider;
pub use types::{
    Claims, ClaimsRefresh, OtpKind, Session, SessionTokens, SessionUpdate, SignIn, SignUp,
    SignUpRequest, User, UserMetadata,
};

use async_trait::async_trait;
use secrecy::SecretString;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<SignIn, ProviderError>;

    async fn sign_up(&self, request: SignUpRequest) -> Result<SignUp, ProviderError>;

    /// Revoke the session identified by `tokens`.
    async fn sign_out(&self, tokens: &SessionTokens) -> Result<(), ProviderError>;

    /// Resolve the claims behind `tokens`, refreshing the pair when the access
    /// token is no longer accepted.
    async fn get_claims(&self, tokens: &SessionTokens) -> Result<ClaimsRefresh, ProviderError>;

    async fn verify_otp(&self, token_hash: &str, kind: OtpKind) -> Result<Session, ProviderError>;
}
