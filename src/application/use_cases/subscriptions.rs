use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::{
        payment::PaymentApproved,
        subscription::{Subscription, SubscriptionStatus},
    },
    use_cases::plans::PlanRepo,
};

// ============================================================================
// Input Types
// ============================================================================

#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub status: SubscriptionStatus,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionUpdate {
    pub status: Option<SubscriptionStatus>,
    pub ends_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Repository Trait
// ============================================================================

#[async_trait]
pub trait SubscriptionRepo: Send + Sync {
    async fn create(&self, input: &NewSubscription) -> AppResult<Subscription>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Subscription>>;
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Subscription>>;
    async fn list_active_by_user(&self, user_id: Uuid) -> AppResult<Vec<Subscription>>;
    async fn list(&self, status: Option<SubscriptionStatus>) -> AppResult<Vec<Subscription>>;
    async fn update(&self, id: Uuid, update: &SubscriptionUpdate) -> AppResult<Subscription>;
    async fn exists_active(&self, user_id: Uuid, plan_id: Uuid) -> AppResult<bool>;
    /// ACTIVE subscriptions whose end date lies before `now`.
    async fn list_expired_active(&self, now: DateTime<Utc>) -> AppResult<Vec<Subscription>>;
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct SubscriptionUseCases {
    subscription_repo: Arc<dyn SubscriptionRepo>,
    plan_repo: Arc<dyn PlanRepo>,
}

impl SubscriptionUseCases {
    pub fn new(subscription_repo: Arc<dyn SubscriptionRepo>, plan_repo: Arc<dyn PlanRepo>) -> Self {
        Self {
            subscription_repo,
            plan_repo,
        }
    }

    /// Create a PENDING subscription against an active plan. The end date is
    /// derived from the plan duration; no payment is created here.
    pub async fn create(&self, user_id: Uuid, plan_id: Uuid) -> AppResult<Subscription> {
        let plan = self
            .plan_repo
            .get_by_id(plan_id)
            .await?
            .ok_or(AppError::NotFound("Plan not found".into()))?;

        if !plan.is_active {
            return Err(AppError::Conflict("Plan is not active".into()));
        }

        if self
            .subscription_repo
            .exists_active(user_id, plan_id)
            .await?
        {
            return Err(AppError::Conflict(
                "User already has an active subscription for this plan".into(),
            ));
        }

        let starts_at = Utc::now();
        let ends_at = starts_at + Duration::days(i64::from(plan.duration_days));

        self.subscription_repo
            .create(&NewSubscription {
                user_id,
                plan_id,
                status: SubscriptionStatus::Pending,
                starts_at,
                ends_at,
            })
            .await
    }

    /// Look up a subscription; when `requester_id` is set, the subscription
    /// must belong to that user.
    pub async fn find_by_id(
        &self,
        id: Uuid,
        requester_id: Option<Uuid>,
    ) -> AppResult<Subscription> {
        let subscription = self
            .subscription_repo
            .get_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Subscription not found".into()))?;

        if let Some(requester_id) = requester_id {
            if subscription.user_id != requester_id {
                return Err(AppError::Forbidden(
                    "Access denied to this subscription".into(),
                ));
            }
        }

        Ok(subscription)
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<Subscription>> {
        self.subscription_repo.list_by_user(user_id).await
    }

    pub async fn find_active_by_user(&self, user_id: Uuid) -> AppResult<Vec<Subscription>> {
        self.subscription_repo.list_active_by_user(user_id).await
    }

    pub async fn find_all(
        &self,
        status: Option<SubscriptionStatus>,
    ) -> AppResult<Vec<Subscription>> {
        self.subscription_repo.list(status).await
    }

    /// Cancel a subscription. Terminal states are rejected; `requester_id`
    /// is `None` for operator-driven cancellation.
    pub async fn cancel(&self, id: Uuid, requester_id: Option<Uuid>) -> AppResult<Subscription> {
        let subscription = self.find_by_id(id, requester_id).await?;

        if !subscription
            .status
            .can_transition_to(SubscriptionStatus::Cancelled)
        {
            let msg = if subscription.status == SubscriptionStatus::Cancelled {
                "Subscription is already cancelled"
            } else {
                "Cannot cancel an expired subscription"
            };
            return Err(AppError::Conflict(msg.into()));
        }

        self.subscription_repo
            .update(
                id,
                &SubscriptionUpdate {
                    status: Some(SubscriptionStatus::Cancelled),
                    cancelled_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await
    }

    /// Operator-driven activation. Only rejects subscriptions that are
    /// already active; it does not verify an approved payment exists.
    pub async fn activate(&self, id: Uuid) -> AppResult<Subscription> {
        let subscription = self.find_by_id(id, None).await?;

        if subscription.status == SubscriptionStatus::Active {
            return Err(AppError::Conflict("Subscription is already active".into()));
        }

        self.subscription_repo
            .update(
                id,
                &SubscriptionUpdate {
                    status: Some(SubscriptionStatus::Active),
                    ..Default::default()
                },
            )
            .await
    }

    /// Privileged activation path for payment confirmation. Writes ACTIVE
    /// directly, bypassing the "already active" guard.
    pub async fn handle_payment_approved(
        &self,
        event: PaymentApproved,
    ) -> AppResult<Subscription> {
        self.subscription_repo
            .update(
                event.subscription_id,
                &SubscriptionUpdate {
                    status: Some(SubscriptionStatus::Active),
                    ..Default::default()
                },
            )
            .await
    }

    /// Extend an active subscription by one plan duration, counted from the
    /// current end date rather than from now.
    pub async fn renew(&self, id: Uuid) -> AppResult<Subscription> {
        let subscription = self.find_by_id(id, None).await?;

        if subscription.status != SubscriptionStatus::Active {
            return Err(AppError::Conflict(
                "Only active subscriptions can be renewed".into(),
            ));
        }

        let plan = self
            .plan_repo
            .get_by_id(subscription.plan_id)
            .await?
            .ok_or(AppError::NotFound("Plan not found".into()))?;

        let new_ends_at = subscription.ends_at + Duration::days(i64::from(plan.duration_days));

        self.subscription_repo
            .update(
                id,
                &SubscriptionUpdate {
                    ends_at: Some(new_ends_at),
                    ..Default::default()
                },
            )
            .await
    }

    /// Best-effort sweep: transition every ACTIVE subscription with a past
    /// end date to EXPIRED. Records are processed independently; a failure
    /// on one does not abort the sweep. Returns the number transitioned.
    pub async fn expire_subscriptions(&self) -> AppResult<u64> {
        let candidates = self.subscription_repo.list_expired_active(Utc::now()).await?;

        let mut expired = 0u64;
        for subscription in candidates {
            let result = self
                .subscription_repo
                .update(
                    subscription.id,
                    &SubscriptionUpdate {
                        status: Some(SubscriptionStatus::Expired),
                        ..Default::default()
                    },
                )
                .await;

            match result {
                Ok(_) => expired += 1,
                Err(err) => {
                    warn!(
                        subscription_id = %subscription.id,
                        error = ?err,
                        "Failed to expire subscription, continuing sweep"
                    );
                }
            }
        }

        Ok(expired)
    }
}
