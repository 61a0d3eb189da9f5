use super::with_session;
use crate::api::{auth::sanitize_next, state::AppState};
use crate::provider::{OtpKind, SessionUpdate};
use axum::{
    extract::{Extension, Query},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

pub const ERROR_PATH: &str = "/error";

#[derive(Deserialize, Debug, Default)]
pub struct ConfirmQuery {
    pub token_hash: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub next: Option<String>,
}

/// Landing point of the confirmation email link.
pub async fn confirm(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<ConfirmQuery>,
) -> Response {
    let token_hash = query.token_hash.as_deref().filter(|hash| !hash.is_empty());
    let kind = query.kind.as_deref().and_then(OtpKind::parse);
    let (Some(token_hash), Some(kind)) = (token_hash, kind) else {
        warn!("Email confirmation link without a usable token");
        return Redirect::to(ERROR_PATH).into_response();
    };

    match state.provider().verify_otp(token_hash, kind).await {
        Ok(session) => {
            info!(user_id = %session.user.id, kind = kind.as_str(), "email confirmed");
            state.layout().revalidate();
            let location = sanitize_next(query.next.as_deref());
            with_session(
                Redirect::to(&location).into_response(),
                state.config(),
                &SessionUpdate::Refreshed(session),
            )
        }
        Err(err) => {
            warn!("Email confirmation failed: {err}");
            Redirect::to(ERROR_PATH).into_response()
        }
    }
}
