//! In-memory mock implementations of the repository traits.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::{
        payment::{Payment, PaymentStatus},
        plan::Plan,
        subscription::{Subscription, SubscriptionStatus},
    },
    use_cases::{
        payments::{NewPayment, PaymentRepo, PaymentUpdate},
        plans::{CreatePlanInput, PlanRepo, UpdatePlanInput},
        subscriptions::{NewSubscription, SubscriptionRepo, SubscriptionUpdate},
    },
};

// ============================================================================
// Plans
// ============================================================================

/// In-memory implementation of PlanRepo for testing.
#[derive(Default)]
pub struct InMemoryPlanRepo {
    pub plans: Mutex<HashMap<Uuid, Plan>>,
    active_subscription_counts: Mutex<HashMap<Uuid, i64>>,
}

impl InMemoryPlanRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repo with a plan.
    pub fn insert(&self, plan: Plan) {
        self.plans.lock().unwrap().insert(plan.id, plan);
    }

    /// Fix the value `count_active_subscriptions` reports for a plan.
    pub fn set_active_subscriptions(&self, plan_id: Uuid, count: i64) {
        self.active_subscription_counts
            .lock()
            .unwrap()
            .insert(plan_id, count);
    }
}

#[async_trait]
impl PlanRepo for InMemoryPlanRepo {
    async fn create(&self, input: &CreatePlanInput) -> AppResult<Plan> {
        let now = Utc::now();
        let plan = Plan {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            description: input.description.clone(),
            price: input.price,
            duration_days: input.duration_days,
            features: input.features.clone(),
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };
        self.plans.lock().unwrap().insert(plan.id, plan.clone());
        Ok(plan)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Plan>> {
        Ok(self.plans.lock().unwrap().get(&id).cloned())
    }

    async fn list(&self, active_only: bool) -> AppResult<Vec<Plan>> {
        Ok(self
            .plans
            .lock()
            .unwrap()
            .values()
            .filter(|p| !active_only || p.is_active)
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, input: &UpdatePlanInput) -> AppResult<Plan> {
        let mut plans = self.plans.lock().unwrap();
        let plan = plans
            .get_mut(&id)
            .ok_or(AppError::NotFound("Plan not found".into()))?;

        if let Some(name) = &input.name {
            plan.name = name.clone();
        }
        if let Some(description) = &input.description {
            plan.description = Some(description.clone());
        }
        if let Some(price) = input.price {
            plan.price = price;
        }
        if let Some(duration_days) = input.duration_days {
            plan.duration_days = duration_days;
        }
        if let Some(features) = &input.features {
            plan.features = features.clone();
        }
        if let Some(is_active) = input.is_active {
            plan.is_active = is_active;
        }
        plan.updated_at = Utc::now();

        Ok(plan.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.plans
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::NotFound("Plan not found".into()))
    }

    async fn count_active_subscriptions(&self, plan_id: Uuid) -> AppResult<i64> {
        Ok(self
            .active_subscription_counts
            .lock()
            .unwrap()
            .get(&plan_id)
            .copied()
            .unwrap_or(0))
    }
}

// ============================================================================
// Subscriptions
// ============================================================================

/// In-memory implementation of SubscriptionRepo for testing.
#[derive(Default)]
pub struct InMemorySubscriptionRepo {
    pub subscriptions: Mutex<HashMap<Uuid, Subscription>>,
    failing_updates: Mutex<HashSet<Uuid>>,
}

impl InMemorySubscriptionRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repo with a subscription.
    pub fn insert(&self, subscription: Subscription) {
        self.subscriptions
            .lock()
            .unwrap()
            .insert(subscription.id, subscription);
    }

    /// Make `update` fail for a specific id, to exercise error paths.
    pub fn fail_update_for(&self, id: Uuid) {
        self.failing_updates.lock().unwrap().insert(id);
    }
}

#[async_trait]
impl SubscriptionRepo for InMemorySubscriptionRepo {
    async fn create(&self, input: &NewSubscription) -> AppResult<Subscription> {
        let now = Utc::now();
        let subscription = Subscription {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            plan_id: input.plan_id,
            status: input.status,
            starts_at: input.starts_at,
            ends_at: input.ends_at,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        };
        self.subscriptions
            .lock()
            .unwrap()
            .insert(subscription.id, subscription.clone());
        Ok(subscription)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Subscription>> {
        Ok(self.subscriptions.lock().unwrap().get(&id).cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Subscription>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_active_by_user(&self, user_id: Uuid) -> AppResult<Vec<Subscription>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.user_id == user_id && s.status == SubscriptionStatus::Active)
            .cloned()
            .collect())
    }

    async fn list(&self, status: Option<SubscriptionStatus>) -> AppResult<Vec<Subscription>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .values()
            .filter(|s| status.is_none_or(|wanted| s.status == wanted))
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, update: &SubscriptionUpdate) -> AppResult<Subscription> {
        if self.failing_updates.lock().unwrap().contains(&id) {
            return Err(AppError::Database("injected update failure".into()));
        }

        let mut subscriptions = self.subscriptions.lock().unwrap();
        let subscription = subscriptions
            .get_mut(&id)
            .ok_or(AppError::NotFound("Subscription not found".into()))?;

        if let Some(status) = update.status {
            subscription.status = status;
        }
        if let Some(ends_at) = update.ends_at {
            subscription.ends_at = ends_at;
        }
        if let Some(cancelled_at) = update.cancelled_at {
            subscription.cancelled_at = Some(cancelled_at);
        }
        subscription.updated_at = Utc::now();

        Ok(subscription.clone())
    }

    async fn exists_active(&self, user_id: Uuid, plan_id: Uuid) -> AppResult<bool> {
        Ok(self.subscriptions.lock().unwrap().values().any(|s| {
            s.user_id == user_id
                && s.plan_id == plan_id
                && s.status == SubscriptionStatus::Active
        }))
    }

    async fn list_expired_active(&self, now: DateTime<Utc>) -> AppResult<Vec<Subscription>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.status == SubscriptionStatus::Active && s.ends_at < now)
            .cloned()
            .collect())
    }
}

// ============================================================================
// Payments
// ============================================================================

/// In-memory implementation of PaymentRepo for testing.
#[derive(Default)]
pub struct InMemoryPaymentRepo {
    pub payments: Mutex<HashMap<Uuid, Payment>>,
}

impl InMemoryPaymentRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repo with a payment.
    pub fn insert(&self, payment: Payment) {
        self.payments.lock().unwrap().insert(payment.id, payment);
    }
}

#[async_trait]
impl PaymentRepo for InMemoryPaymentRepo {
    async fn create(&self, input: &NewPayment) -> AppResult<Payment> {
        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            subscription_id: input.subscription_id,
            amount: input.amount,
            method: input.method,
            status: input.status,
            external_id: None,
            external_data: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        };
        self.payments
            .lock()
            .unwrap()
            .insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Payment>> {
        Ok(self.payments.lock().unwrap().get(&id).cloned())
    }

    async fn get_by_external_id(&self, external_id: &str) -> AppResult<Option<Payment>> {
        Ok(self
            .payments
            .lock()
            .unwrap()
            .values()
            .find(|p| p.external_id.as_deref() == Some(external_id))
            .cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Payment>> {
        Ok(self
            .payments
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_by_subscription(&self, subscription_id: Uuid) -> AppResult<Vec<Payment>> {
        Ok(self
            .payments
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.subscription_id == subscription_id)
            .cloned()
            .collect())
    }

    async fn list(&self, status: Option<PaymentStatus>) -> AppResult<Vec<Payment>> {
        Ok(self
            .payments
            .lock()
            .unwrap()
            .values()
            .filter(|p| status.is_none_or(|wanted| p.status == wanted))
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, update: &PaymentUpdate) -> AppResult<Payment> {
        let mut payments = self.payments.lock().unwrap();
        let payment = payments
            .get_mut(&id)
            .ok_or(AppError::NotFound("Payment not found".into()))?;

        if let Some(status) = update.status {
            payment.status = status;
        }
        if let Some(external_id) = &update.external_id {
            payment.external_id = Some(external_id.clone());
        }
        if let Some(external_data) = &update.external_data {
            payment.external_data = Some(external_data.clone());
        }
        if let Some(paid_at) = update.paid_at {
            payment.paid_at = Some(paid_at);
        }
        payment.updated_at = Utc::now();

        Ok(payment.clone())
    }

    async fn count_by_status(&self, status: PaymentStatus) -> AppResult<i64> {
        Ok(self
            .payments
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.status == status)
            .count() as i64)
    }

    async fn total_revenue(&self) -> AppResult<Decimal> {
        Ok(self
            .payments
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.status == PaymentStatus::Approved)
            .map(|p| p.amount)
            .sum())
    }
}
