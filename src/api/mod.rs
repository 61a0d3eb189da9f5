#![allow(clippy::needless_for_each)]

pub mod auth;
pub(crate) mod cookies;
pub mod gate;
pub mod handlers;
pub mod layout;
pub(crate) mod pages;
pub mod state;

use self::{
    handlers::{actions, health, login, toasts},
    state::AppState,
};
use anyhow::Result;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{delete, get, post},
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, info_span, Span};
use ulid::Ulid;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        actions::login,
        actions::signup,
        toasts::list,
        toasts::remove
    ),
    components(schemas(
        health::Health,
        auth::ActionResult,
        auth::LoginForm,
        auth::SignupForm,
        crate::toast::Toast,
        crate::toast::ToastKind
    )),
    tags(
        (name = "authgate", description = "Session gate and auth actions")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Build the application router.
///
/// Everything above the gate layer requires a session unless its path is
/// public; `/health` and the API docs are mounted after it and never gated.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::account))
        .route("/login", get(login::page).post(login::submit))
        .route("/login/actions/login", post(actions::login))
        .route("/login/actions/signup", post(actions::signup))
        .route("/login/toasts", get(toasts::list))
        .route("/login/toasts/events", get(toasts::events))
        .route("/login/toasts/:id", delete(toasts::remove))
        .route("/login/toasts/:id/dismiss", post(toasts::dismiss))
        .route("/auth/confirm", get(handlers::confirm))
        .route("/auth/signout", post(handlers::signout))
        .route("/error", get(handlers::error_page))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate::session_gate,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(state)),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi()))
        .route("/health", get(health::health).options(health::health))
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, state: Arc<AppState>) -> Result<()> {
    let app = router(state);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
