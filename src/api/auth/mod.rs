//! Login and signup actions.
//!
//! Actions never fail: every path ends in an [`ActionResult`], and the
//! provider is only contacted once the form passes validation.

pub mod classify;
mod types;
pub mod validation;

pub use classify::{classify_login, classify_signup, AuthFailure};
pub use types::{ActionOutcome, ActionResult, LoginForm, SignupForm};
pub use validation::{sanitize_next, ValidationError};

use super::state::AppState;
use crate::provider::{SessionTokens, SessionUpdate, SignUpRequest, UserMetadata};
use tracing::{debug, info, instrument, warn};

pub const SIGNUP_CONFIRM_MESSAGE: &str =
    "Sign up complete. Please confirm your email using the link sent to your inbox.";

/// Sign in with email and password.
///
/// A session for an account whose email is still unconfirmed is revoked on
/// the spot, so login never succeeds before confirmation.
#[instrument(skip_all)]
pub async fn login(state: &AppState, form: &LoginForm) -> ActionOutcome {
    let credentials = match validation::validate_login(form) {
        Ok(credentials) => credentials,
        Err(err) => {
            debug!("login form rejected: {err}");
            return ActionOutcome::failure(err.to_string());
        }
    };

    let signed_in = match state
        .provider()
        .sign_in_with_password(&credentials.email, &credentials.password)
        .await
    {
        Ok(signed_in) => signed_in,
        Err(err) => {
            let failure = classify_login(&err);
            info!(?failure, "login refused: {err}");
            return ActionOutcome::failure(failure.to_string());
        }
    };

    if signed_in.user.as_ref().is_some_and(|user| !user.is_confirmed()) {
        if let Some(session) = &signed_in.session {
            if let Err(err) = state.provider().sign_out(&SessionTokens::from(session)).await {
                warn!("Failed to revoke session of unconfirmed account: {err}");
            }
        }
        return ActionOutcome {
            result: ActionResult::failure(AuthFailure::EmailNotConfirmed.to_string()),
            session: SessionUpdate::Cleared,
        };
    }

    state.layout().revalidate();

    ActionOutcome {
        result: ActionResult::redirect(sanitize_next(credentials.next.as_deref())),
        session: signed_in
            .session
            .map_or(SessionUpdate::Unchanged, SessionUpdate::Refreshed),
    }
}

/// Create an account. Unconfirmed accounts get a notice and stay on the page.
#[instrument(skip_all)]
pub async fn signup(state: &AppState, form: &SignupForm) -> ActionOutcome {
    let details = match validation::validate_signup(form) {
        Ok(details) => details,
        Err(err) => {
            debug!("signup form rejected: {err}");
            return ActionOutcome::failure(err.to_string());
        }
    };

    let request = SignUpRequest {
        email: details.email,
        password: details.password,
        metadata: UserMetadata::named(&details.fullname),
        redirect_to: state.config().email_redirect_url(),
    };

    let signed_up = match state.provider().sign_up(request).await {
        Ok(signed_up) => signed_up,
        Err(err) => {
            let failure = classify_signup(&err);
            info!(?failure, "signup refused: {err}");
            return ActionOutcome::failure(failure.to_string());
        }
    };

    state.layout().revalidate();

    if signed_up.user.as_ref().is_some_and(|user| !user.is_confirmed()) {
        return ActionOutcome {
            result: ActionResult::notice(SIGNUP_CONFIRM_MESSAGE),
            session: SessionUpdate::Unchanged,
        };
    }

    ActionOutcome {
        result: ActionResult::redirect("/"),
        session: signed_up
            .session
            .map_or(SessionUpdate::Unchanged, SessionUpdate::Refreshed),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::state::AuthConfig;
    use crate::provider::{MemoryProvider, ProviderError};
    use std::sync::Arc;

    fn app(provider: MemoryProvider) -> (Arc<MemoryProvider>, AppState) {
        let provider = Arc::new(provider);
        let state = AppState::new(AuthConfig::default(), provider.clone());
        (provider, state)
    }

    fn login_form(email: &str, password: &str, next: Option<&str>) -> LoginForm {
        LoginForm {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            next: next.map(str::to_string),
        }
    }

    fn signup_form(fullname: &str, email: &str, password: &str) -> SignupForm {
        SignupForm {
            fullname: Some(fullname.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn invalid_forms_never_reach_the_provider() {
        let (provider, state) = app(MemoryProvider::new());

        let outcome = login(&state, &LoginForm::default()).await;
        assert!(!outcome.result.success);

        for email in ["no-at-sign", "a@b"] {
            let outcome = login(&state, &login_form(email, "secret123", None)).await;
            assert_eq!(
                outcome.result,
                ActionResult::failure(ValidationError::InvalidEmail.to_string())
            );
            let outcome = signup(&state, &signup_form("Alice", email, "secret123")).await;
            assert!(!outcome.result.success);
        }

        let outcome = signup(&state, &SignupForm::default()).await;
        assert!(!outcome.result.success);

        assert_eq!(provider.calls(), 0);
        assert_eq!(state.layout().revision(), 0);
    }

    #[tokio::test]
    async fn login_redirects_to_next() {
        let (provider, state) = app(MemoryProvider::new());
        provider
            .add_user("alice@example.com", "secret123", "Alice", true)
            .await;

        let outcome = login(
            &state,
            &login_form(" Alice@Example.com ", "secret123", Some("/dashboard")),
        )
        .await;
        assert_eq!(outcome.result, ActionResult::redirect("/dashboard"));
        assert!(matches!(outcome.session, SessionUpdate::Refreshed(_)));
        assert_eq!(state.layout().revision(), 1);
    }

    #[tokio::test]
    async fn login_ignores_offsite_next() {
        let (provider, state) = app(MemoryProvider::new());
        provider
            .add_user("alice@example.com", "secret123", "Alice", true)
            .await;

        let outcome = login(
            &state,
            &login_form("alice@example.com", "secret123", Some("//evil.example")),
        )
        .await;
        assert_eq!(outcome.result.redirect.as_deref(), Some("/"));
    }

    #[tokio::test]
    async fn login_wrong_password() {
        let (provider, state) = app(MemoryProvider::new());
        provider
            .add_user("alice@example.com", "secret123", "Alice", true)
            .await;

        let outcome = login(&state, &login_form("alice@example.com", "nope-nope", None)).await;
        assert_eq!(
            outcome.result,
            ActionResult::failure("Wrong email or password.")
        );
        assert!(outcome.session.is_unchanged());
        assert_eq!(state.layout().revision(), 0);
    }

    #[tokio::test]
    async fn login_classifies_uncoded_provider_wording() {
        let (provider, state) = app(MemoryProvider::new());
        provider
            .fail_next(ProviderError::api(400, None, "INVALID LOGIN CREDENTIALS"))
            .await;

        let outcome = login(&state, &login_form("alice@example.com", "secret123", None)).await;
        assert_eq!(
            outcome.result.message.as_deref(),
            Some("Wrong email or password.")
        );
    }

    #[tokio::test]
    async fn login_provider_refusing_unconfirmed_account() {
        let (provider, state) = app(MemoryProvider::new());
        provider
            .add_user("bob@example.com", "secret123", "Bob", false)
            .await;

        let outcome = login(&state, &login_form("bob@example.com", "secret123", None)).await;
        assert_eq!(
            outcome.result,
            ActionResult::failure(AuthFailure::EmailNotConfirmed.to_string())
        );
    }

    #[tokio::test]
    async fn login_revokes_session_of_unconfirmed_account() {
        let (provider, state) = app(MemoryProvider::new().with_unconfirmed_sign_in(true));
        provider
            .add_user("bob@example.com", "secret123", "Bob", false)
            .await;

        let outcome = login(&state, &login_form("bob@example.com", "secret123", None)).await;
        assert!(!outcome.result.success);
        assert_eq!(
            outcome.result.message.as_deref(),
            Some(AuthFailure::EmailNotConfirmed.to_string().as_str())
        );
        assert_eq!(outcome.session, SessionUpdate::Cleared);
        assert_eq!(provider.active_sessions().await, 0);
        assert_eq!(state.layout().revision(), 0);
    }

    #[tokio::test]
    async fn signup_unconfirmed_has_no_redirect() {
        let (provider, state) = app(MemoryProvider::new());

        let outcome = signup(
            &state,
            &signup_form("  Alice Liddell ", "Alice@Example.com", "secret123"),
        )
        .await;
        assert_eq!(outcome.result, ActionResult::notice(SIGNUP_CONFIRM_MESSAGE));
        assert!(outcome.result.redirect.is_none());
        assert!(outcome.session.is_unchanged());
        assert_eq!(state.layout().revision(), 1);
        assert!(provider.confirmation_token("alice@example.com").await.is_some());
    }

    #[tokio::test]
    async fn signup_autoconfirmed_redirects_home_with_session() {
        let (_provider, state) = app(MemoryProvider::new().with_autoconfirm(true));

        let outcome = signup(&state, &signup_form("Alice", "alice@example.com", "secret123")).await;
        assert_eq!(outcome.result, ActionResult::redirect("/"));
        match outcome.session {
            SessionUpdate::Refreshed(session) => {
                assert_eq!(
                    session.user.user_metadata.full_name.as_deref(),
                    Some("Alice")
                );
            }
            other => panic!("expected a session, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn signup_existing_email() {
        let (provider, state) = app(MemoryProvider::new());
        provider
            .add_user("alice@example.com", "secret123", "Alice", true)
            .await;

        let outcome = signup(&state, &signup_form("Alice", "alice@example.com", "secret123")).await;
        assert_eq!(
            outcome.result,
            ActionResult::failure(AuthFailure::AlreadyRegistered.to_string())
        );
        assert_eq!(state.layout().revision(), 0);
    }
}
