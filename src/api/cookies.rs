//! Session cookie reading and writing.

use super::state::AuthConfig;
use crate::provider::{Session, SessionTokens, SessionUpdate};
use crate::toast::PAGE_SESSION_COOKIE;
use axum::http::{
    header::{InvalidHeaderValue, COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};
use tracing::error;

/// Find the value of cookie `name` across every `Cookie` header.
pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub(crate) fn session_tokens(headers: &HeaderMap, config: &AuthConfig) -> SessionTokens {
    SessionTokens {
        access_token: cookie_value(headers, &config.access_cookie_name()),
        refresh_token: cookie_value(headers, &config.refresh_cookie_name()),
    }
}

fn cookie(
    config: &AuthConfig,
    name: &str,
    value: &str,
    max_age: i64,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn session_cookies(
    config: &AuthConfig,
    session: &Session,
) -> Result<Vec<HeaderValue>, InvalidHeaderValue> {
    let ttl = config.session_ttl_seconds();
    Ok(vec![
        cookie(config, &config.access_cookie_name(), &session.access_token, ttl)?,
        cookie(config, &config.refresh_cookie_name(), &session.refresh_token, ttl)?,
    ])
}

fn clear_session_cookies(config: &AuthConfig) -> Result<Vec<HeaderValue>, InvalidHeaderValue> {
    Ok(vec![
        cookie(config, &config.access_cookie_name(), "", 0)?,
        cookie(config, &config.refresh_cookie_name(), "", 0)?,
    ])
}

/// `Set-Cookie` values that bring the client in line with `update`.
///
/// Tokens that cannot be expressed as a header value are logged and dropped;
/// the client then keeps its previous cookies.
pub(crate) fn set_cookie_headers(config: &AuthConfig, update: &SessionUpdate) -> Vec<HeaderValue> {
    let cookies = match update {
        SessionUpdate::Unchanged => return Vec::new(),
        SessionUpdate::Refreshed(session) => session_cookies(config, session),
        SessionUpdate::Cleared => clear_session_cookies(config),
    };

    cookies.unwrap_or_else(|err| {
        error!("Failed to build session cookie: {err}");
        Vec::new()
    })
}

/// Rewrite the request's `Cookie` header so handlers further down see the
/// same session the client will hold after this response.
pub(crate) fn rewrite_request_cookies(
    headers: &mut HeaderMap,
    config: &AuthConfig,
    update: &SessionUpdate,
) {
    if update.is_unchanged() {
        return;
    }

    let access_name = config.access_cookie_name();
    let refresh_name = config.refresh_cookie_name();
    let mut pairs: Vec<String> = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let key = pair.split_once('=').map_or(*pair, |(key, _)| key.trim());
            key != access_name && key != refresh_name
        })
        .map(ToString::to_string)
        .collect();

    if let SessionUpdate::Refreshed(session) = update {
        pairs.push(format!("{access_name}={}", session.access_token));
        pairs.push(format!("{refresh_name}={}", session.refresh_token));
    }

    headers.remove(COOKIE);
    if pairs.is_empty() {
        return;
    }
    match HeaderValue::from_str(&pairs.join("; ")) {
        Ok(value) => {
            headers.insert(COOKIE, value);
        }
        Err(err) => error!("Failed to rewrite request cookies: {err}"),
    }
}

pub(crate) fn append_set_cookies(headers: &mut HeaderMap, cookies: Vec<HeaderValue>) {
    for cookie in cookies {
        headers.append(SET_COOKIE, cookie);
    }
}

fn set_cookie_name(value: &HeaderValue) -> Option<&str> {
    let (name, _) = value.to_str().ok()?.split(';').next()?.split_once('=')?;
    Some(name.trim())
}

/// Append `cookies` unless the response already sets a cookie of the same
/// name. Browsers apply `Set-Cookie` in order, and a handler's update is
/// newer than the one computed before it ran.
pub(crate) fn merge_set_cookies(headers: &mut HeaderMap, cookies: Vec<HeaderValue>) {
    let taken: Vec<String> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(set_cookie_name)
        .map(ToString::to_string)
        .collect();

    for cookie in cookies {
        let shadowed = set_cookie_name(&cookie)
            .is_some_and(|name| taken.iter().any(|taken| taken == name));
        if !shadowed {
            headers.append(SET_COOKIE, cookie);
        }
    }
}

/// Cookie binding the browser to its toast list on the login page.
pub(crate) fn page_session_cookie(
    config: &AuthConfig,
    id: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{PAGE_SESSION_COOKIE}={id}; Path=/login; HttpOnly; SameSite=Lax");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::provider::{User, UserMetadata};
    use uuid::Uuid;

    fn session(access: &str, refresh: &str) -> Session {
        Session {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
            expires_in: 3600,
            user: User {
                id: Uuid::new_v4(),
                email: Some("alice@example.com".to_string()),
                email_confirmed_at: None,
                user_metadata: UserMetadata::default(),
            },
        }
    }

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn session_tokens_reads_both_cookies() {
        let config = AuthConfig::default();
        let headers = headers("theme=dark; authgate-access-token=aaa; authgate-refresh-token=rrr");
        let tokens = session_tokens(&headers, &config);
        assert_eq!(tokens.access_token.as_deref(), Some("aaa"));
        assert_eq!(tokens.refresh_token.as_deref(), Some("rrr"));
    }

    #[test]
    fn cookie_value_ignores_empty_and_missing() {
        let headers = headers("authgate-access-token=; other=1");
        assert_eq!(cookie_value(&headers, "authgate-access-token"), None);
        assert_eq!(cookie_value(&headers, "missing"), None);
        assert_eq!(cookie_value(&headers, "other").as_deref(), Some("1"));
    }

    #[test]
    fn refreshed_update_sets_both_cookies() {
        let config = AuthConfig::new("https://app.example.com".to_string());
        let cookies = set_cookie_headers(&config, &SessionUpdate::Refreshed(session("a1", "r1")));
        assert_eq!(cookies.len(), 2);
        let access = cookies[0].to_str().unwrap();
        assert!(access.starts_with("authgate-access-token=a1; Path=/; HttpOnly; SameSite=Lax"));
        assert!(access.ends_with("; Secure"));
    }

    #[test]
    fn cleared_update_expires_cookies() {
        let config = AuthConfig::default();
        let cookies = set_cookie_headers(&config, &SessionUpdate::Cleared);
        assert_eq!(cookies.len(), 2);
        for cookie in cookies {
            let cookie = cookie.to_str().unwrap();
            assert!(cookie.contains("=; Path=/"));
            assert!(cookie.contains("Max-Age=0"));
            assert!(!cookie.contains("Secure"));
        }
        assert!(set_cookie_headers(&config, &SessionUpdate::Unchanged).is_empty());
    }

    #[test]
    fn rewrite_replaces_session_cookies_and_keeps_others() {
        let config = AuthConfig::default();
        let mut headers =
            headers("theme=dark; authgate-access-token=old; authgate-refresh-token=oldr");
        rewrite_request_cookies(
            &mut headers,
            &config,
            &SessionUpdate::Refreshed(session("new", "newr")),
        );
        let tokens = session_tokens(&headers, &config);
        assert_eq!(tokens.access_token.as_deref(), Some("new"));
        assert_eq!(tokens.refresh_token.as_deref(), Some("newr"));
        assert_eq!(cookie_value(&headers, "theme").as_deref(), Some("dark"));
    }

    #[test]
    fn rewrite_drops_cleared_session() {
        let config = AuthConfig::default();
        let mut headers = headers("authgate-access-token=old; authgate-refresh-token=oldr");
        rewrite_request_cookies(&mut headers, &config, &SessionUpdate::Cleared);
        assert!(headers.get(COOKIE).is_none());
        assert!(session_tokens(&headers, &config).is_empty());
    }

    #[test]
    fn page_session_cookie_is_scoped_to_login() {
        let config = AuthConfig::default();
        let cookie = page_session_cookie(&config, "01HZX").unwrap();
        assert_eq!(
            cookie.to_str().unwrap(),
            "authgate_page=01HZX; Path=/login; HttpOnly; SameSite=Lax"
        );
    }

    #[test]
    fn merge_keeps_cookies_the_response_already_sets() {
        let config = AuthConfig::default();
        let mut response = HeaderMap::new();
        append_set_cookies(
            &mut response,
            set_cookie_headers(&config, &SessionUpdate::Refreshed(session("fresh", "freshr"))),
        );
        append_set_cookies(&mut response, vec![HeaderValue::from_static("theme=dark")]);

        merge_set_cookies(&mut response, set_cookie_headers(&config, &SessionUpdate::Cleared));

        let cookies: Vec<&str> = response
            .get_all(SET_COOKIE)
            .iter()
            .map(|value| value.to_str().unwrap())
            .collect();
        assert_eq!(cookies.len(), 3);
        assert!(cookies[0].starts_with("authgate-access-token=fresh;"));
        assert!(cookies[1].starts_with("authgate-refresh-token=freshr;"));
        assert!(cookies.iter().all(|cookie| !cookie.contains("Max-Age=0")));
    }

    #[test]
    fn merge_appends_when_nothing_is_shadowed() {
        let config = AuthConfig::default();
        let mut response = HeaderMap::new();
        merge_set_cookies(&mut response, set_cookie_headers(&config, &SessionUpdate::Cleared));
        assert_eq!(response.get_all(SET_COOKIE).iter().count(), 2);
    }
}
