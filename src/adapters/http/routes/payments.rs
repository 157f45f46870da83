use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    adapters::http::{
        app_state::AppState,
        extract::{AdminUser, AuthUser},
    },
    app_error::AppResult,
    domain::entities::payment::{Payment, PaymentStatus},
    use_cases::payments::{InitiatePaymentInput, UpdatePaymentStatusInput},
};

#[derive(Deserialize)]
struct ListQuery {
    status: Option<PaymentStatus>,
}

#[derive(Serialize)]
struct PaymentsResponse {
    items: Vec<Payment>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_own).post(initiate_payment))
        .route("/all", get(list_all))
        .route("/stats", get(stats))
        .route("/{id}", get(get_payment))
        .route("/{id}/status", patch(update_status))
}

async fn initiate_payment(
    State(app_state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<InitiatePaymentInput>,
) -> AppResult<impl IntoResponse> {
    let payment = app_state
        .payment_use_cases
        .initiate_payment(user_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

async fn list_own(
    State(app_state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<impl IntoResponse> {
    let payments = app_state.payment_use_cases.find_by_user(user_id).await?;
    Ok(Json(PaymentsResponse { items: payments }))
}

async fn list_all(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let payments = app_state.payment_use_cases.find_all(query.status).await?;
    Ok(Json(PaymentsResponse { items: payments }))
}

async fn get_payment(
    State(app_state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let payment = app_state
        .payment_use_cases
        .find_by_id(id, Some(user_id))
        .await?;
    Ok(Json(payment))
}

async fn update_status(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentStatusInput>,
) -> AppResult<impl IntoResponse> {
    let payment = app_state.payment_use_cases.update_status(id, payload).await?;
    Ok(Json(payment))
}

async fn stats(
    State(app_state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<impl IntoResponse> {
    let stats = app_state.payment_use_cases.stats().await?;
    Ok(Json(stats))
}
