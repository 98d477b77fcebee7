use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::error::StorefrontError;
use crate::view_models::PaymentsView;
use crate::AppState;

pub async fn get_payments(State(state): State<AppState>) -> Json<PaymentsView> {
    Json(state.storefront.payments.view())
}

pub async fn refresh_payments(
    State(state): State<AppState>,
) -> Result<Json<PaymentsView>, StorefrontError> {
    state.storefront.payments.refresh().await?;
    Ok(Json(state.storefront.payments.view()))
}

pub async fn dismiss_payment_notice(
    State(state): State<AppState>,
    Path(notice_id): Path<u64>,
) -> StatusCode {
    if state.storefront.payments.dismiss_notice(notice_id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
