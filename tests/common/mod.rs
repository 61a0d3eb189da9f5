#![allow(dead_code, clippy::unwrap_used)]

use authgate::api::{
    self,
    state::{AppState, AuthConfig},
};
use authgate::provider::{IdentityProvider, MemoryProvider};
use axum::{
    body::{to_bytes, Body},
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        Method, Request,
    },
    response::Response,
    Router,
};
use secrecy::SecretString;
use std::sync::Arc;
use tower::ServiceExt;

pub fn app(provider: MemoryProvider) -> (Arc<MemoryProvider>, Router) {
    let provider = Arc::new(provider);
    let state = Arc::new(AppState::new(AuthConfig::default(), provider.clone()));
    (provider, api::router(state))
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

fn request(method: Method, uri: &str, cookie: Option<&str>) -> axum::http::request::Builder {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    request(Method::GET, uri, cookie).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str, cookie: Option<&str>) -> Request<Body> {
    request(Method::DELETE, uri, cookie)
        .body(Body::empty())
        .unwrap()
}

pub fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    request(Method::POST, uri, cookie)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn location(response: &Response) -> &str {
    response.headers().get(LOCATION).unwrap().to_str().unwrap()
}

pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// `Cookie` header a browser would send after `response`, ignoring deletions.
pub fn cookie_jar(response: &Response) -> String {
    set_cookies(response)
        .iter()
        .filter_map(|cookie| cookie.split(';').next())
        .filter(|pair| !pair.ends_with('='))
        .collect::<Vec<_>>()
        .join("; ")
}

pub async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Sign in directly against the provider and return the session cookies.
pub async fn signed_in_cookie(provider: &MemoryProvider, email: &str, password: &str) -> String {
    let session = provider
        .sign_in_with_password(email, &SecretString::from(password.to_string()))
        .await
        .unwrap()
        .session
        .unwrap();
    format!(
        "authgate-access-token={}; authgate-refresh-token={}",
        session.access_token, session.refresh_token
    )
}

/// The last `Set-Cookie` for `name`: the one a browser ends up keeping.
pub fn last_set_cookie(response: &Response, name: &str) -> String {
    let prefix = format!("{name}=");
    set_cookies(response)
        .into_iter()
        .rev()
        .find(|cookie| cookie.starts_with(&prefix))
        .unwrap()
}
