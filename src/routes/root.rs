use crate::views::layout;
use axum::{http::StatusCode, response::Html, response::IntoResponse};

pub async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(layout::not_found().into_string()))
}
