pub mod account;
pub use self::account::account;

pub mod actions;

pub mod confirm;
pub use self::confirm::confirm;

pub mod error_page;
pub use self::error_page::error_page;

pub mod health;
pub use self::health::health;

pub mod login;

pub mod signout;
pub use self::signout::signout;

pub mod toasts;

// common functions for the handlers
use super::{cookies, state::AuthConfig};
use crate::provider::SessionUpdate;
use crate::toast::PAGE_SESSION_COOKIE;
use axum::{
    http::{header::SET_COOKIE, HeaderMap},
    response::Response,
};
use tracing::error;
use ulid::Ulid;

/// Attach the session cookies `update` calls for.
pub(crate) fn with_session(
    mut response: Response,
    config: &AuthConfig,
    update: &SessionUpdate,
) -> Response {
    let set_cookies = cookies::set_cookie_headers(config, update);
    cookies::append_set_cookies(response.headers_mut(), set_cookies);
    response
}

/// Attach the page-session cookie unless the browser already sent `id`.
pub(crate) fn with_page_session(
    mut response: Response,
    config: &AuthConfig,
    request_headers: &HeaderMap,
    id: Ulid,
) -> Response {
    let id = id.to_string();
    if cookies::cookie_value(request_headers, PAGE_SESSION_COOKIE).as_deref() == Some(id.as_str()) {
        return response;
    }

    match cookies::page_session_cookie(config, &id) {
        Ok(cookie) => {
            response.headers_mut().append(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build page session cookie: {err}"),
    }
    response
}
