//! Toast endpoints for the login page's page session.

use crate::api::{cookies, gate::LOGIN_PATH, state::AppState};
use crate::toast::{Toast, Toaster, PAGE_SESSION_COOKIE};
use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Redirect, Response,
    },
};
use futures_util::stream;
use std::{convert::Infallible, sync::Arc};
use tracing::{debug, error};

async fn page_toaster(state: &AppState, headers: &HeaderMap) -> Option<Toaster> {
    let id = cookies::cookie_value(headers, PAGE_SESSION_COOKIE)?;
    state.pages().get(&id).await
}

#[utoipa::path(
    get,
    path = "/login/toasts",
    responses (
        (status = 200, description = "Toasts of the caller's page session, in display order", body = [Toast])
    ),
    tag = "toasts",
)]
pub async fn list(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<Vec<Toast>> {
    let toasts = page_toaster(&state, &headers)
        .await
        .map_or_else(Vec::new, |toaster| toaster.toasts());
    Json(toasts)
}

#[utoipa::path(
    delete,
    path = "/login/toasts/{id}",
    params (
        ("id" = String, Path, description = "Toast id")
    ),
    responses (
        (status = 204, description = "Toast removed, or it was already gone")
    ),
    tag = "toasts",
)]
pub async fn remove(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> StatusCode {
    if let Some(toaster) = page_toaster(&state, &headers).await {
        let removed = toaster.remove_toast(&id);
        debug!(%id, removed, "toast removal requested");
    }
    StatusCode::NO_CONTENT
}

/// Form-friendly variant of [`remove`] that sends the browser back to the page.
pub async fn dismiss(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Redirect {
    if let Some(toaster) = page_toaster(&state, &headers).await {
        toaster.remove_toast(&id);
    }
    Redirect::to(LOGIN_PATH)
}

fn toasts_event(toasts: &[Toast]) -> Event {
    Event::default()
        .event("toasts")
        .json_data(toasts)
        .unwrap_or_else(|err| {
            error!("Failed to encode toast event: {err}");
            Event::default().event("error")
        })
}

/// Server-sent events carrying the full list on connect and after every change.
///
/// The stream ends once the page session is dropped.
pub async fn events(Extension(state): Extension<Arc<AppState>>, headers: HeaderMap) -> Response {
    let Some(toaster) = page_toaster(&state, &headers).await else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let updates = stream::unfold((toaster.subscribe(), true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let toasts = rx.borrow_and_update().clone();
        Some((Ok::<_, Infallible>(toasts_event(&toasts)), (rx, false)))
    });

    Sse::new(updates)
        .keep_alive(KeepAlive::default())
        .into_response()
}
