use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::{
        payment::{Payment, PaymentApproved, PaymentMethod, PaymentStatus},
        subscription::SubscriptionStatus,
    },
    use_cases::{plans::PlanRepo, subscriptions::SubscriptionUseCases},
};

// ============================================================================
// Input Types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct InitiatePaymentInput {
    pub subscription_id: Uuid,
    pub method: PaymentMethod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePaymentStatusInput {
    pub status: PaymentStatus,
    pub external_id: Option<String>,
    pub external_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub user_id: Uuid,
    pub subscription_id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct PaymentUpdate {
    pub status: Option<PaymentStatus>,
    pub external_id: Option<String>,
    pub external_data: Option<serde_json::Value>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentStats {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub revenue: Decimal,
}

// ============================================================================
// Repository Trait
// ============================================================================

#[async_trait]
pub trait PaymentRepo: Send + Sync {
    async fn create(&self, input: &NewPayment) -> AppResult<Payment>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Payment>>;
    async fn get_by_external_id(&self, external_id: &str) -> AppResult<Option<Payment>>;
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Payment>>;
    async fn list_by_subscription(&self, subscription_id: Uuid) -> AppResult<Vec<Payment>>;
    async fn list(&self, status: Option<PaymentStatus>) -> AppResult<Vec<Payment>>;
    async fn update(&self, id: Uuid, update: &PaymentUpdate) -> AppResult<Payment>;
    async fn count_by_status(&self, status: PaymentStatus) -> AppResult<i64>;
    /// Sum of amounts over APPROVED payments.
    async fn total_revenue(&self) -> AppResult<Decimal>;
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct PaymentUseCases {
    payment_repo: Arc<dyn PaymentRepo>,
    plan_repo: Arc<dyn PlanRepo>,
    subscriptions: Arc<SubscriptionUseCases>,
}

impl PaymentUseCases {
    pub fn new(
        payment_repo: Arc<dyn PaymentRepo>,
        plan_repo: Arc<dyn PlanRepo>,
        subscriptions: Arc<SubscriptionUseCases>,
    ) -> Self {
        Self {
            payment_repo,
            plan_repo,
            subscriptions,
        }
    }

    /// Open a PENDING payment against a subscription the caller owns. The
    /// amount is a snapshot of the plan price at this moment.
    pub async fn initiate_payment(
        &self,
        user_id: Uuid,
        input: InitiatePaymentInput,
    ) -> AppResult<Payment> {
        let subscription = self
            .subscriptions
            .find_by_id(input.subscription_id, Some(user_id))
            .await?;

        match subscription.status {
            SubscriptionStatus::Active => {
                return Err(AppError::Conflict("Subscription is already active".into()));
            }
            SubscriptionStatus::Cancelled => {
                return Err(AppError::Conflict(
                    "Cannot pay for a cancelled subscription".into(),
                ));
            }
            _ => {}
        }

        let existing = self
            .payment_repo
            .list_by_subscription(input.subscription_id)
            .await?;
        if existing.iter().any(|p| p.status.is_open()) {
            return Err(AppError::Conflict(
                "Subscription already has a pending or approved payment".into(),
            ));
        }

        let plan = self
            .plan_repo
            .get_by_id(subscription.plan_id)
            .await?
            .ok_or(AppError::Internal("Plan not found".into()))?;

        self.payment_repo
            .create(&NewPayment {
                user_id,
                subscription_id: input.subscription_id,
                amount: plan.price,
                method: input.method,
                status: PaymentStatus::Pending,
            })
            .await
    }

    /// Look up a payment; when `requester_id` is set, the payment must
    /// belong to that user.
    pub async fn find_by_id(&self, id: Uuid, requester_id: Option<Uuid>) -> AppResult<Payment> {
        let payment = self
            .payment_repo
            .get_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Payment not found".into()))?;

        if let Some(requester_id) = requester_id {
            if payment.user_id != requester_id {
                return Err(AppError::Forbidden("Access denied to this payment".into()));
            }
        }

        Ok(payment)
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<Payment>> {
        self.payment_repo.list_by_user(user_id).await
    }

    pub async fn find_all(&self, status: Option<PaymentStatus>) -> AppResult<Vec<Payment>> {
        self.payment_repo.list(status).await
    }

    /// Apply a status update from an operator or webhook. The new status is
    /// persisted without a legality check on the origin state (the gateway
    /// is trusted); on APPROVED, a `PaymentApproved` event activates the
    /// linked subscription and `paid_at` is stamped.
    pub async fn update_status(
        &self,
        id: Uuid,
        input: UpdatePaymentStatusInput,
    ) -> AppResult<Payment> {
        let payment = self.find_by_id(id, None).await?;

        let mut update = PaymentUpdate {
            status: Some(input.status),
            external_id: input.external_id,
            external_data: input.external_data,
            paid_at: None,
        };

        // Activation runs first; the payment row only reads APPROVED once
        // the subscription transition has been persisted.
        if input.status == PaymentStatus::Approved {
            update.paid_at = Some(Utc::now());
            self.subscriptions
                .handle_payment_approved(PaymentApproved {
                    subscription_id: payment.subscription_id,
                })
                .await?;
        }

        self.payment_repo.update(id, &update).await
    }

    /// Ingest a gateway notification: resolve the payment by its external
    /// reference, map the raw status onto our vocabulary and delegate to
    /// `update_status`.
    pub async fn process_webhook(
        &self,
        external_id: &str,
        raw_status: &str,
        external_data: Option<serde_json::Value>,
    ) -> AppResult<Payment> {
        let payment = self
            .payment_repo
            .get_by_external_id(external_id)
            .await?
            .ok_or(AppError::NotFound("Payment not found".into()))?;

        let status = PaymentStatus::from_webhook(raw_status);

        self.update_status(
            payment.id,
            UpdatePaymentStatusInput {
                status,
                external_id: None,
                external_data,
            },
        )
        .await
    }

    pub async fn stats(&self) -> AppResult<PaymentStats> {
        let pending = self.payment_repo.count_by_status(PaymentStatus::Pending).await?;
        let approved = self
            .payment_repo
            .count_by_status(PaymentStatus::Approved)
            .await?;
        let rejected = self
            .payment_repo
            .count_by_status(PaymentStatus::Rejected)
            .await?;
        let revenue = self.payment_repo.total_revenue().await?;

        Ok(PaymentStats {
            total: pending + approved + rejected,
            pending,
            approved,
            rejected,
            revenue,
        })
    }
}
