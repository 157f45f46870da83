use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    adapters::http::{app_state::AppState, extract::AdminUser},
    app_error::AppResult,
    domain::entities::plan::Plan,
    use_cases::plans::{CreatePlanInput, UpdatePlanInput},
};

#[derive(serde::Serialize)]
struct PlansResponse {
    items: Vec<Plan>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_plans).post(create_plan))
        .route("/all", get(list_all_plans))
        .route(
            "/{id}",
            get(get_plan).patch(update_plan).delete(delete_plan),
        )
        .route("/{id}/toggle", post(toggle_plan))
}

/// Public catalogue: active plans only.
async fn list_plans(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let plans = app_state.plan_use_cases.find_all(true).await?;
    Ok(Json(PlansResponse { items: plans }))
}

async fn list_all_plans(
    State(app_state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<impl IntoResponse> {
    let plans = app_state.plan_use_cases.find_all(false).await?;
    Ok(Json(PlansResponse { items: plans }))
}

async fn get_plan(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let plan = app_state.plan_use_cases.find_by_id(id).await?;
    Ok(Json(plan))
}

async fn create_plan(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<CreatePlanInput>,
) -> AppResult<impl IntoResponse> {
    let plan = app_state.plan_use_cases.create(payload).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

async fn update_plan(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePlanInput>,
) -> AppResult<impl IntoResponse> {
    let plan = app_state.plan_use_cases.update(id, payload).await?;
    Ok(Json(plan))
}

async fn delete_plan(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    app_state.plan_use_cases.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_plan(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let plan = app_state.plan_use_cases.toggle_active(id).await?;
    Ok(Json(plan))
}
