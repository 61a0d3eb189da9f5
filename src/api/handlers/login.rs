//! The login page and its form submission.
//!
//! Submissions follow post/redirect/get: the outcome is turned into a toast on
//! the browser's page session and the browser is sent on with a 303.

use super::{with_page_session, with_session};
use crate::api::{
    auth::{self, ActionResult, LoginForm, SignupForm},
    cookies,
    pages::{self, LoginMode, LoginPage},
    state::AppState,
};
use crate::toast::{ToastKind, Toaster, PAGE_SESSION_COOKIE};
use axum::{
    extract::{Extension, Form, Query},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use url::form_urlencoded;

pub const FALLBACK_ERROR: &str = "Something went wrong.";

#[derive(Deserialize, Debug, Default)]
pub struct LoginQuery {
    pub mode: Option<String>,
    pub next: Option<String>,
}

/// Every field either form can send.
#[derive(Deserialize, Default)]
pub struct Submission {
    pub mode: Option<String>,
    pub fullname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub next: Option<String>,
}

pub async fn page(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<LoginQuery>,
) -> Response {
    // Page sessions are only created by submissions that leave a toast.
    let toaster = match cookies::cookie_value(&headers, PAGE_SESSION_COOKIE) {
        Some(id) => state.pages().get(&id).await,
        None => None,
    };
    let toasts = toaster.as_ref().map(Toaster::toasts).unwrap_or_default();

    let next = query.next.as_deref().filter(|next| !next.is_empty());
    pages::render(&LoginPage::new(
        LoginMode::parse(query.mode.as_deref()),
        next,
        &toasts,
        toaster.is_some(),
    ))
}

/// The toast a finished action leaves behind, if any.
fn outcome_toast(result: &ActionResult) -> Option<(String, ToastKind)> {
    if result.success {
        result
            .message
            .clone()
            .map(|message| (message, ToastKind::Success))
    } else {
        let message = result
            .message
            .clone()
            .unwrap_or_else(|| FALLBACK_ERROR.to_string());
        Some((message, ToastKind::Error))
    }
}

/// Where the browser goes when the action has no redirect of its own.
fn back_to_login(mode: LoginMode, next: Option<&str>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if mode == LoginMode::SignUp {
        query.append_pair("mode", "signup");
    }
    if let Some(next) = next.filter(|next| !next.is_empty()) {
        query.append_pair("next", next);
    }
    let query = query.finish();
    if query.is_empty() {
        "/login".to_string()
    } else {
        format!("/login?{query}")
    }
}

pub async fn submit(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Form(submission): Form<Submission>,
) -> Response {
    let mode = LoginMode::parse(submission.mode.as_deref());
    let outcome = match mode {
        LoginMode::SignIn => {
            let form = LoginForm {
                email: submission.email,
                password: submission.password,
                next: submission.next.clone(),
            };
            auth::login(&state, &form).await
        }
        LoginMode::SignUp => {
            let form = SignupForm {
                fullname: submission.fullname,
                email: submission.email,
                password: submission.password,
            };
            auth::signup(&state, &form).await
        }
    };

    let location = outcome
        .result
        .redirect
        .clone()
        .unwrap_or_else(|| back_to_login(mode, submission.next.as_deref()));
    debug!(success = outcome.result.success, %location, "login page submission");

    let response = with_session(
        Redirect::to(&location).into_response(),
        state.config(),
        &outcome.session,
    );

    match outcome_toast(&outcome.result) {
        Some((message, kind)) => {
            let page_id = cookies::cookie_value(&headers, PAGE_SESSION_COOKIE);
            let (id, toaster) = state.pages().open(page_id.as_deref()).await;
            toaster.show_toast(message, kind);
            with_page_session(response, state.config(), &headers, id)
        }
        None => response,
    }
}
