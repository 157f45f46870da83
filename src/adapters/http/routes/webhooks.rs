use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::Deserialize;

use crate::{adapters::http::app_state::AppState, app_error::AppResult};

/// Gateway notification. `status` is the gateway's raw vocabulary and is
/// mapped onto ours during processing.
#[derive(Deserialize)]
struct PaymentWebhookPayload {
    external_id: String,
    status: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/payments", post(payment_webhook))
}

async fn payment_webhook(
    State(app_state): State<AppState>,
    Json(payload): Json<PaymentWebhookPayload>,
) -> AppResult<impl IntoResponse> {
    let payment = app_state
        .payment_use_cases
        .process_webhook(&payload.external_id, &payload.status, payload.data)
        .await?;
    Ok(Json(payment))
}
