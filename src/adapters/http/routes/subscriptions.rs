use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    adapters::http::{
        app_state::AppState,
        extract::{AdminUser, AuthUser},
    },
    app_error::AppResult,
    domain::entities::subscription::{Subscription, SubscriptionStatus},
};

#[derive(Deserialize)]
struct CreatePayload {
    plan_id: Uuid,
}

#[derive(Deserialize)]
struct ListQuery {
    status: Option<SubscriptionStatus>,
}

#[derive(Serialize)]
struct SubscriptionsResponse {
    items: Vec<Subscription>,
}

#[derive(Serialize)]
struct SweepResponse {
    expired: u64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_own).post(create_subscription))
        .route("/active", get(list_own_active))
        .route("/all", get(list_all))
        .route("/expire", post(run_expiration_sweep))
        .route("/{id}", get(get_subscription))
        .route("/{id}/cancel", post(cancel_subscription))
        .route("/{id}/activate", post(activate_subscription))
        .route("/{id}/renew", post(renew_subscription))
}

async fn create_subscription(
    State(app_state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreatePayload>,
) -> AppResult<impl IntoResponse> {
    let subscription = app_state
        .subscription_use_cases
        .create(user_id, payload.plan_id)
        .await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

async fn list_own(
    State(app_state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<impl IntoResponse> {
    let subscriptions = app_state.subscription_use_cases.find_by_user(user_id).await?;
    Ok(Json(SubscriptionsResponse {
        items: subscriptions,
    }))
}

async fn list_own_active(
    State(app_state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<impl IntoResponse> {
    let subscriptions = app_state
        .subscription_use_cases
        .find_active_by_user(user_id)
        .await?;
    Ok(Json(SubscriptionsResponse {
        items: subscriptions,
    }))
}

async fn list_all(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let subscriptions = app_state.subscription_use_cases.find_all(query.status).await?;
    Ok(Json(SubscriptionsResponse {
        items: subscriptions,
    }))
}

async fn get_subscription(
    State(app_state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let subscription = app_state
        .subscription_use_cases
        .find_by_id(id, Some(user_id))
        .await?;
    Ok(Json(subscription))
}

async fn cancel_subscription(
    State(app_state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let subscription = app_state
        .subscription_use_cases
        .cancel(id, Some(user_id))
        .await?;
    Ok(Json(subscription))
}

async fn activate_subscription(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let subscription = app_state.subscription_use_cases.activate(id).await?;
    Ok(Json(subscription))
}

async fn renew_subscription(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let subscription = app_state.subscription_use_cases.renew(id).await?;
    Ok(Json(subscription))
}

/// Manual trigger for the expiration sweep; the background worker runs the
/// same operation on an interval.
async fn run_expiration_sweep(
    State(app_state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<impl IntoResponse> {
    let expired = app_state
        .subscription_use_cases
        .expire_subscriptions()
        .await?;
    Ok(Json(SweepResponse { expired }))
}
