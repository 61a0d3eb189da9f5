//! JSON endpoints for the auth actions, for pages that submit with `fetch`.

use super::with_session;
use crate::api::{
    auth::{self, ActionOutcome, ActionResult, LoginForm, SignupForm},
    state::AppState,
};
use axum::{
    extract::{Extension, Form},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

fn respond(state: &AppState, outcome: ActionOutcome) -> Response {
    with_session(
        Json(outcome.result).into_response(),
        state.config(),
        &outcome.session,
    )
}

#[utoipa::path(
    post,
    path = "/login/actions/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses (
        (status = 200, description = "Outcome of the login attempt; session cookies are set on success", body = ActionResult)
    ),
    tag = "auth",
)]
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Response {
    let outcome = auth::login(&state, &form).await;
    respond(&state, outcome)
}

#[utoipa::path(
    post,
    path = "/login/actions/signup",
    request_body(content = SignupForm, content_type = "application/x-www-form-urlencoded"),
    responses (
        (status = 200, description = "Outcome of the signup attempt", body = ActionResult)
    ),
    tag = "auth",
)]
pub async fn signup(
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<SignupForm>,
) -> Response {
    let outcome = auth::signup(&state, &form).await;
    respond(&state, outcome)
}
