//! Server-rendered pages, as askama templates under `templates/`.

use crate::toast::Toast;
use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginMode {
    #[default]
    SignIn,
    SignUp,
}

impl LoginMode {
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        if value == Some("signup") {
            Self::SignUp
        } else {
            Self::SignIn
        }
    }
}

/// Link switching between sign in and sign up, keeping `next`.
fn toggle_href(mode: LoginMode, next: Option<&str>) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if mode == LoginMode::SignIn {
        query.append_pair("mode", "signup");
    }
    if let Some(next) = next {
        query.append_pair("next", next);
    }
    let query = query.finish();
    if query.is_empty() {
        "/login".to_string()
    } else {
        format!("/login?{query}")
    }
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage<'a> {
    title: &'static str,
    subtitle: &'static str,
    action: &'static str,
    toggle: &'static str,
    toggle_href: String,
    signup: bool,
    next: Option<&'a str>,
    toasts: &'a [Toast],
    /// Subscribe to the toast stream; only useful with a page session.
    live: bool,
}

impl<'a> LoginPage<'a> {
    #[must_use]
    pub fn new(mode: LoginMode, next: Option<&'a str>, toasts: &'a [Toast], live: bool) -> Self {
        let (title, subtitle, action, toggle) = match mode {
            LoginMode::SignIn => (
                "Sign in",
                "Sign in to your account",
                "login",
                "No account yet? Sign up",
            ),
            LoginMode::SignUp => (
                "Sign up",
                "Create a new account",
                "signup",
                "Already registered? Sign in",
            ),
        };

        Self {
            title,
            subtitle,
            action,
            toggle,
            toggle_href: toggle_href(mode, next),
            signup: mode == LoginMode::SignUp,
            next,
            toasts,
            live,
        }
    }
}

#[derive(Template)]
#[template(path = "account.html")]
pub struct AccountPage<'a> {
    pub name: &'a str,
    pub email: &'a str,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage;

/// Render `page` as HTML, or a bare 500 when the template fails.
pub(crate) fn render(page: &impl Template) -> Response {
    match page.render() {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            error!("Template rendering error: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Template rendering failed",
            )
                .into_response()
        }
    }
}
