use axum::{http::StatusCode, response::IntoResponse};

pub const GREETING: &str = "Hello, World!";
pub const ERROR_MESSAGE: &str = "This is an error";

pub async fn hello() -> &'static str {
    tracing::info!("{}", GREETING);
    GREETING
}

pub async fn error_page() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, ERROR_MESSAGE)
}
