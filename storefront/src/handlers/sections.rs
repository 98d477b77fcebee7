use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::shell::Section;
use crate::AppState;

pub async fn show_section(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let section = match name.parse::<Section>() {
        Ok(section) => section,
        Err(message) => {
            tracing::warn!(section = %name, "Unknown section requested");
            return (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response();
        }
    };

    Json(state.storefront.navigate(section).await).into_response()
}
