use crate::api::pages::{self, ErrorPage};
use axum::response::Response;

pub async fn error_page() -> Response {
    pages::render(&ErrorPage)
}
