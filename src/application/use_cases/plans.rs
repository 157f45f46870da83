use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::plan::Plan,
};

// ============================================================================
// Input Types
// ============================================================================

fn default_is_active() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlanInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub duration_days: i32,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePlanInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub duration_days: Option<i32>,
    pub features: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

// ============================================================================
// Repository Trait
// ============================================================================

#[async_trait]
pub trait PlanRepo: Send + Sync {
    async fn create(&self, input: &CreatePlanInput) -> AppResult<Plan>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Plan>>;
    async fn list(&self, active_only: bool) -> AppResult<Vec<Plan>>;
    async fn update(&self, id: Uuid, input: &UpdatePlanInput) -> AppResult<Plan>;
    async fn delete(&self, id: Uuid) -> AppResult<()>;
    /// Number of ACTIVE subscriptions referencing this plan.
    async fn count_active_subscriptions(&self, plan_id: Uuid) -> AppResult<i64>;
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct PlanUseCases {
    plan_repo: Arc<dyn PlanRepo>,
}

impl PlanUseCases {
    pub fn new(plan_repo: Arc<dyn PlanRepo>) -> Self {
        Self { plan_repo }
    }

    pub async fn create(&self, input: CreatePlanInput) -> AppResult<Plan> {
        if input.name.trim().len() < 2 {
            return Err(AppError::InvalidInput(
                "Plan name must be at least 2 characters".into(),
            ));
        }
        if input.price <= Decimal::ZERO {
            return Err(AppError::InvalidInput("Price must be positive".into()));
        }
        if input.duration_days <= 0 {
            return Err(AppError::InvalidInput(
                "Duration must be a positive number of days".into(),
            ));
        }

        self.plan_repo.create(&input).await
    }

    pub async fn find_all(&self, active_only: bool) -> AppResult<Vec<Plan>> {
        self.plan_repo.list(active_only).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Plan> {
        self.plan_repo
            .get_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Plan not found".into()))
    }

    pub async fn update(&self, id: Uuid, input: UpdatePlanInput) -> AppResult<Plan> {
        if let Some(name) = &input.name {
            if name.trim().len() < 2 {
                return Err(AppError::InvalidInput(
                    "Plan name must be at least 2 characters".into(),
                ));
            }
        }
        if let Some(price) = input.price {
            if price <= Decimal::ZERO {
                return Err(AppError::InvalidInput("Price must be positive".into()));
            }
        }
        if let Some(duration_days) = input.duration_days {
            if duration_days <= 0 {
                return Err(AppError::InvalidInput(
                    "Duration must be a positive number of days".into(),
                ));
            }
        }

        // Surface a NotFound before attempting the update.
        self.find_by_id(id).await?;
        self.plan_repo.update(id, &input).await
    }

    /// Delete a plan. Refused while any ACTIVE subscription references it;
    /// the error message carries the count.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.find_by_id(id).await?;

        let active_subscriptions = self.plan_repo.count_active_subscriptions(id).await?;
        if active_subscriptions > 0 {
            return Err(AppError::Conflict(format!(
                "Cannot delete plan with {} active subscriptions",
                active_subscriptions
            )));
        }

        self.plan_repo.delete(id).await
    }

    pub async fn toggle_active(&self, id: Uuid) -> AppResult<Plan> {
        let plan = self.find_by_id(id).await?;

        self.plan_repo
            .update(
                id,
                &UpdatePlanInput {
                    is_active: Some(!plan.is_active),
                    ..Default::default()
                },
            )
            .await
    }
}
