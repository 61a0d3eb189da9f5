use super::with_session;
use crate::api::{cookies, gate::LOGIN_PATH, state::AppState};
use crate::provider::SessionUpdate;
use axum::{
    extract::Extension,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::warn;

/// Revoke the session and always clear the cookies, even if the provider
/// could not be reached.
pub async fn signout(Extension(state): Extension<Arc<AppState>>, headers: HeaderMap) -> Response {
    let tokens = cookies::session_tokens(&headers, state.config());
    if !tokens.is_empty() {
        if let Err(err) = state.provider().sign_out(&tokens).await {
            warn!("Provider sign out failed: {err}");
        }
    }

    state.layout().revalidate();

    with_session(
        Redirect::to(LOGIN_PATH).into_response(),
        state.config(),
        &SessionUpdate::Cleared,
    )
}
