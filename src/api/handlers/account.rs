use crate::api::{
    gate::CurrentUser,
    pages::{self, AccountPage},
    state::AppState,
};
use crate::provider::Claims;
use axum::{
    extract::Extension,
    http::{
        header::{CACHE_CONTROL, ETAG, IF_NONE_MATCH},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::error;

pub const UNKNOWN_NAME: &str = "Unknown";
pub const NO_EMAIL: &str = "No email on file";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountView {
    pub name: String,
    pub email: String,
}

impl AccountView {
    #[must_use]
    pub fn from_claims(claims: Option<&Claims>) -> Self {
        let name = claims
            .and_then(|claims| {
                let metadata = &claims.metadata;
                metadata
                    .full_name
                    .as_deref()
                    .filter(|name| !name.is_empty())
                    .or_else(|| metadata.display_name.as_deref().filter(|name| !name.is_empty()))
            })
            .unwrap_or(UNKNOWN_NAME);
        let email = claims
            .and_then(|claims| claims.email.as_deref())
            .filter(|email| !email.is_empty())
            .unwrap_or(NO_EMAIL);

        Self {
            name: name.to_string(),
            email: email.to_string(),
        }
    }
}

fn matches_etag(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(IF_NONE_MATCH)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|candidate| candidate.trim() == etag || candidate.trim() == "*")
}

/// Account page for the signed-in user, revalidated against the layout revision.
pub async fn account(
    Extension(state): Extension<Arc<AppState>>,
    user: Option<Extension<CurrentUser>>,
    headers: HeaderMap,
) -> Response {
    let claims = user.as_ref().map(|Extension(CurrentUser(claims))| claims);
    let etag = state.layout().etag(claims.map(|claims| claims.sub));

    let mut response = if matches_etag(&headers, &etag) {
        StatusCode::NOT_MODIFIED.into_response()
    } else {
        let view = AccountView::from_claims(claims);
        pages::render(&AccountPage {
            name: &view.name,
            email: &view.email,
        })
    };

    match HeaderValue::from_str(&etag) {
        Ok(value) => {
            response.headers_mut().insert(ETAG, value);
        }
        Err(err) => error!("Failed to build ETag header: {err}"),
    }
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("private, no-cache"));
    response
}
