//! Per-request session gate.
//!
//! The decision itself is pure: `(uri, authenticated) -> GateDecision`. The
//! middleware wraps it with the provider round trip and threads the session
//! cookies explicitly, from the request's cookies in to `Set-Cookie` out.

use super::{cookies, state::AppState};
use crate::provider::{Claims, ClaimsRefresh, IdentityProvider, SessionTokens, SessionUpdate};
use axum::{
    extract::{Request, State},
    http::{Method, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{debug, warn};
use url::form_urlencoded;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";
pub const PUBLIC_PREFIXES: [&str; 3] = ["/login", "/auth", "/error"];

const NEXT_PARAM: &str = "next";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Public,
    Protected,
}

/// Paths reachable without a session. Prefix match, so `/authors` is public too.
#[must_use]
pub fn classify(path: &str) -> RouteKind {
    if PUBLIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        RouteKind::Public
    } else {
        RouteKind::Protected
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Continue,
    Redirect(String),
}

#[must_use]
pub fn decide(uri: &Uri, authenticated: bool) -> GateDecision {
    let path = uri.path();

    if !authenticated && classify(path) == RouteKind::Protected {
        let next = (path != HOME_PATH).then_some(path);
        return GateDecision::Redirect(location(LOGIN_PATH, uri.query(), next));
    }

    if authenticated && path == LOGIN_PATH {
        return GateDecision::Redirect(location(HOME_PATH, uri.query(), None));
    }

    GateDecision::Continue
}

/// Redirect target keeping the original query string, with `next` replaced
/// when given.
fn location(path: &str, query: Option<&str>, next: Option<&str>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
        if next.is_some() && key == NEXT_PARAM {
            continue;
        }
        serializer.append_pair(&key, &value);
    }
    if let Some(next) = next {
        serializer.append_pair(NEXT_PARAM, next);
    }

    let query = serializer.finish();
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

/// Claims of the signed-in user, inserted into request extensions by the gate.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

#[derive(Debug)]
pub struct GateOutcome {
    pub decision: GateDecision,
    pub claims: Option<Claims>,
    pub session: SessionUpdate,
}

/// Refresh the session and decide. Provider failures count as signed out.
pub async fn evaluate(
    provider: &dyn IdentityProvider,
    uri: &Uri,
    tokens: &SessionTokens,
) -> GateOutcome {
    let refreshed = match provider.get_claims(tokens).await {
        Ok(refreshed) => refreshed,
        Err(err) => {
            warn!("Session refresh failed, treating request as signed out: {err}");
            ClaimsRefresh::anonymous()
        }
    };

    GateOutcome {
        decision: decide(uri, refreshed.claims.is_some()),
        claims: refreshed.claims,
        session: refreshed.session,
    }
}

/// axum middleware running [`evaluate`] for every request.
///
/// Cookies rewritten by the refresh are written to the request seen by the
/// handler and to whatever response goes back, redirects included.
pub async fn session_gate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let config = state.config();
    let tokens = cookies::session_tokens(request.headers(), config);
    let outcome = evaluate(state.provider(), request.uri(), &tokens).await;

    let set_cookies = cookies::set_cookie_headers(config, &outcome.session);
    cookies::rewrite_request_cookies(request.headers_mut(), config, &outcome.session);

    let mut response = match outcome.decision {
        GateDecision::Redirect(location) => {
            debug!(from = %request.uri().path(), to = %location, "session gate redirect");
            redirect(request.method(), &location)
        }
        GateDecision::Continue => {
            if let Some(claims) = outcome.claims {
                request.extensions_mut().insert(CurrentUser(claims));
            }
            next.run(request).await
        }
    };

    cookies::merge_set_cookies(response.headers_mut(), set_cookies);
    response
}

/// 307 keeps safe requests intact; anything else gets a 303 so the browser
/// follows with a GET instead of replaying the body.
fn redirect(method: &Method, location: &str) -> Response {
    if method == Method::GET || method == Method::HEAD {
        Redirect::temporary(location).into_response()
    } else {
        Redirect::to(location).into_response()
    }
}
