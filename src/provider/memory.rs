//! In-process identity provider for local development and tests.
//!
//! Behaves like the hosted provider as far as this crate can observe: the same
//! error codes and wording, refresh-token rotation, and sessions that stop
//! resolving once signed out. Switches allow simulating auto-confirm projects,
//! providers that let unconfirmed accounts sign in, outages and expiry.

use super::{
    Claims, ClaimsRefresh, ErrorCode, IdentityProvider, OtpKind, ProviderError, Session,
    SessionTokens, SessionUpdate, SignIn, SignUp, SignUpRequest, User, UserMetadata,
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::SystemTime;
use tokio::sync::Mutex;
use tracing::debug;
use ulid::Ulid;
use uuid::Uuid;

const SESSION_EXPIRES_IN_SECONDS: u64 = 3600;
const MIN_PASSWORD_LENGTH: usize = 6;

struct Account {
    user: User,
    password: SecretString,
}

struct ActiveSession {
    user_id: Uuid,
    refresh_token: String,
}

#[derive(Default)]
struct State {
    /// Accounts keyed by normalized email.
    accounts: HashMap<String, Account>,
    /// Access token -> session.
    sessions: HashMap<String, ActiveSession>,
    /// Refresh token -> access token it was issued with.
    refresh_tokens: HashMap<String, String>,
    /// Access tokens that no longer validate but may still be refreshed.
    expired: HashSet<String>,
    /// Pending confirmation token hash -> email.
    confirmations: HashMap<String, String>,
    autoconfirm: bool,
    allow_unconfirmed_sign_in: bool,
    unavailable: bool,
    fail_next: Option<ProviderError>,
}

impl State {
    fn check(&mut self) -> Result<(), ProviderError> {
        if self.unavailable {
            return Err(ProviderError::Unavailable(
                "memory provider switched off".to_string(),
            ));
        }
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn user_by_id(&self, id: Uuid) -> Option<&User> {
        self.accounts
            .values()
            .map(|account| &account.user)
            .find(|user| user.id == id)
    }

    fn issue_session(&mut self, user: &User) -> Session {
        let access_token = Ulid::new().to_string();
        let refresh_token = Ulid::new().to_string();
        self.sessions.insert(
            access_token.clone(),
            ActiveSession {
                user_id: user.id,
                refresh_token: refresh_token.clone(),
            },
        );
        self.refresh_tokens
            .insert(refresh_token.clone(), access_token.clone());

        Session {
            access_token,
            refresh_token,
            expires_in: SESSION_EXPIRES_IN_SECONDS,
            user: user.clone(),
        }
    }

    fn revoke(&mut self, access_token: &str) {
        if let Some(session) = self.sessions.remove(access_token) {
            self.refresh_tokens.remove(&session.refresh_token);
        }
        self.expired.remove(access_token);
    }

    fn confirm(&mut self, email: &str) -> Option<User> {
        let account = self.accounts.get_mut(email)?;
        if account.user.email_confirmed_at.is_none() {
            account.user.email_confirmed_at = Some(now_unix_seconds().to_string());
        }
        Some(account.user.clone())
    }
}

fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn invalid_credentials() -> ProviderError {
    ProviderError::api(
        400,
        Some(ErrorCode::InvalidCredentials),
        "Invalid login credentials",
    )
}

#[derive(Default)]
pub struct MemoryProvider {
    state: Mutex<State>,
    calls: AtomicUsize,
}

impl std::fmt::Debug for MemoryProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryProvider")
            .field("calls", &self.calls.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl MemoryProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Confirm new accounts immediately and hand out a session at signup.
    #[must_use]
    pub fn with_autoconfirm(mut self, enabled: bool) -> Self {
        self.state.get_mut().autoconfirm = enabled;
        self
    }

    /// Let unconfirmed accounts sign in, as some provider configurations do.
    #[must_use]
    pub fn with_unconfirmed_sign_in(mut self, enabled: bool) -> Self {
        self.state.get_mut().allow_unconfirmed_sign_in = enabled;
        self
    }

    /// Seed an account directly, bypassing signup.
    pub async fn add_user(&self, email: &str, password: &str, name: &str, confirmed: bool) -> User {
        let user = User {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
            email_confirmed_at: confirmed.then(|| now_unix_seconds().to_string()),
            user_metadata: UserMetadata::named(name),
        };
        self.state.lock().await.accounts.insert(
            email.to_string(),
            Account {
                user: user.clone(),
                password: SecretString::from(password.to_string()),
            },
        );
        user
    }

    pub async fn confirm_email(&self, email: &str) -> bool {
        self.state.lock().await.confirm(email).is_some()
    }

    /// Token hash that the confirmation email for `email` would carry.
    pub async fn confirmation_token(&self, email: &str) -> Option<String> {
        self.state
            .lock()
            .await
            .confirmations
            .iter()
            .find(|(_, pending)| pending.as_str() == email)
            .map(|(token_hash, _)| token_hash.clone())
    }

    /// Make the next provider call fail with `err`.
    pub async fn fail_next(&self, err: ProviderError) {
        self.state.lock().await.fail_next = Some(err);
    }

    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().await.unavailable = unavailable;
    }

    /// Stop accepting every current access token; refresh tokens stay valid.
    pub async fn expire_access_tokens(&self) {
        let mut state = self.state.lock().await;
        let tokens: Vec<String> = state.sessions.keys().cloned().collect();
        state.expired.extend(tokens);
    }

    pub async fn active_sessions(&self) -> usize {
        self.state.lock().await.sessions.len()
    }

    /// Number of trait calls served so far, successful or not.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdentityProvider for MemoryProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<SignIn, ProviderError> {
        self.record_call();
        let mut state = self.state.lock().await;
        state.check()?;

        let Some(account) = state.accounts.get(email) else {
            return Err(invalid_credentials());
        };
        if account.password.expose_secret() != password.expose_secret() {
            return Err(invalid_credentials());
        }
        let user = account.user.clone();

        if !user.is_confirmed() && !state.allow_unconfirmed_sign_in {
            return Err(ProviderError::api(
                400,
                Some(ErrorCode::EmailNotConfirmed),
                "Email not confirmed",
            ));
        }

        let session = state.issue_session(&user);
        debug!(user_id = %user.id, "memory provider issued session");

        Ok(SignIn {
            user: Some(user),
            session: Some(session),
        })
    }

    async fn sign_up(&self, request: SignUpRequest) -> Result<SignUp, ProviderError> {
        self.record_call();
        let mut state = self.state.lock().await;
        state.check()?;

        if state.accounts.contains_key(&request.email) {
            return Err(ProviderError::api(
                422,
                Some(ErrorCode::UserAlreadyExists),
                "User already registered",
            ));
        }
        if request.password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ProviderError::api(
                422,
                Some(ErrorCode::WeakPassword),
                "Password should be at least 6 characters.",
            ));
        }

        let autoconfirm = state.autoconfirm;
        let user = User {
            id: Uuid::new_v4(),
            email: Some(request.email.clone()),
            email_confirmed_at: autoconfirm.then(|| now_unix_seconds().to_string()),
            user_metadata: request.metadata,
        };
        state.accounts.insert(
            request.email.clone(),
            Account {
                user: user.clone(),
                password: request.password,
            },
        );

        if autoconfirm {
            let session = state.issue_session(&user);
            return Ok(SignUp {
                user: Some(user),
                session: Some(session),
            });
        }

        let token_hash = Ulid::new().to_string();
        debug!(redirect_to = %request.redirect_to, "memory provider queued confirmation");
        state.confirmations.insert(token_hash, request.email);

        Ok(SignUp {
            user: Some(user),
            session: None,
        })
    }

    async fn sign_out(&self, tokens: &SessionTokens) -> Result<(), ProviderError> {
        self.record_call();
        let mut state = self.state.lock().await;
        state.check()?;

        if let Some(access_token) = tokens.access_token.as_deref() {
            state.revoke(access_token);
        }
        if let Some(refresh_token) = tokens.refresh_token.as_deref() {
            if let Some(access_token) = state.refresh_tokens.get(refresh_token).cloned() {
                state.revoke(&access_token);
            }
        }

        Ok(())
    }

    async fn get_claims(&self, tokens: &SessionTokens) -> Result<ClaimsRefresh, ProviderError> {
        self.record_call();
        let mut state = self.state.lock().await;
        state.check()?;

        if tokens.is_empty() {
            return Ok(ClaimsRefresh::anonymous());
        }

        if let Some(access_token) = tokens.access_token.as_deref() {
            if !state.expired.contains(access_token) {
                let user = state
                    .sessions
                    .get(access_token)
                    .and_then(|session| state.user_by_id(session.user_id));
                if let Some(user) = user {
                    return Ok(ClaimsRefresh {
                        claims: Some(Claims::from(user)),
                        session: SessionUpdate::Unchanged,
                    });
                }
            }
        }

        let previous = tokens
            .refresh_token
            .as_deref()
            .and_then(|refresh_token| state.refresh_tokens.get(refresh_token).cloned());
        let Some(previous) = previous else {
            return Ok(ClaimsRefresh {
                claims: None,
                session: SessionUpdate::Cleared,
            });
        };

        let user = state
            .sessions
            .get(&previous)
            .and_then(|session| state.user_by_id(session.user_id))
            .cloned();
        // Refresh tokens are single use: the old pair dies with the rotation.
        state.revoke(&previous);
        let Some(user) = user else {
            return Ok(ClaimsRefresh {
                claims: None,
                session: SessionUpdate::Cleared,
            });
        };

        let session = state.issue_session(&user);
        Ok(ClaimsRefresh {
            claims: Some(Claims::from(&user)),
            session: SessionUpdate::Refreshed(session),
        })
    }

    async fn verify_otp(&self, token_hash: &str, kind: OtpKind) -> Result<Session, ProviderError> {
        self.record_call();
        let mut state = self.state.lock().await;
        state.check()?;

        let email = match kind {
            OtpKind::Signup | OtpKind::Email => state.confirmations.remove(token_hash),
            _ => None,
        };
        let user = email.as_deref().and_then(|email| state.confirm(email));
        let Some(user) = user else {
            return Err(ProviderError::api(
                403,
                Some(ErrorCode::OtpExpired),
                "Email link is invalid or has expired",
            ));
        };

        Ok(state.issue_session(&user))
    }
}
