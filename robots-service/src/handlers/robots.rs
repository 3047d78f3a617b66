use crate::models::Record;
use crate::services::RobotsError;
use crate::startup::AppState;
use axum::{
    extract::{ConnectInfo, State},
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;

/// Returns every stored robot as a JSON array.
///
/// The body is fully serialized before the response is built, so a failure
/// can never leave a half-written 200 behind.
pub async fn all_robots(
    State(state): State<AppState>,
    remote: Option<ConnectInfo<SocketAddr>>,
    method: Method,
    uri: Uri,
) -> Result<Response, RobotsError> {
    let remote_addr = remote
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    tracing::info!(
        method = %method,
        path = %uri.path(),
        remote_addr = %remote_addr,
        "Received request for all robots"
    );

    let records = state.db.fetch_all().await?;
    let count = records.len();

    let body = serde_json::to_vec(&render(records))?;

    tracing::info!(count, bytes = body.len(), "Returning robots");

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}

fn render(records: Vec<Record>) -> serde_json::Value {
    serde_json::Value::Array(records.into_iter().map(Record::into_json).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;
    use serde_json::json;

    #[test]
    fn test_render_keeps_one_element_per_record() {
        let records = vec![
            Record::from(doc! { "name": "R2-D2" }),
            Record::from(doc! { "name": "C-3PO", "fluent_in": 6_000_000_i64 }),
        ];

        assert_eq!(
            render(records),
            json!([
                { "name": "R2-D2" },
                { "name": "C-3PO", "fluent_in": 6_000_000_i64 },
            ])
        );
    }

    #[test]
    fn test_render_empty_collection() {
        assert_eq!(render(Vec::new()), json!([]));
    }
}
