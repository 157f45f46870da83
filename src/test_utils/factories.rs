//! Test data factories.
//!
//! Each factory creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::entities::{
    payment::{Payment, PaymentMethod, PaymentStatus},
    plan::Plan,
    subscription::{Subscription, SubscriptionStatus},
};

/// Create a test plan with sensible defaults.
pub fn create_test_plan(overrides: impl FnOnce(&mut Plan)) -> Plan {
    let now = Utc::now();
    let mut plan = Plan {
        id: Uuid::new_v4(),
        name: "Basic".to_string(),
        description: Some("Basic monthly plan".to_string()),
        price: Decimal::new(2990, 2),
        duration_days: 30,
        features: vec!["Basic access".to_string()],
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    overrides(&mut plan);
    plan
}

/// Create a test subscription with sensible defaults.
pub fn create_test_subscription(overrides: impl FnOnce(&mut Subscription)) -> Subscription {
    let now = Utc::now();
    let mut subscription = Subscription {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        plan_id: Uuid::new_v4(),
        status: SubscriptionStatus::Pending,
        starts_at: now,
        ends_at: now + Duration::days(30),
        cancelled_at: None,
        created_at: now,
        updated_at: now,
    };
    overrides(&mut subscription);
    subscription
}

/// Create a test payment with sensible defaults.
pub fn create_test_payment(overrides: impl FnOnce(&mut Payment)) -> Payment {
    let now = Utc::now();
    let mut payment = Payment {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        subscription_id: Uuid::new_v4(),
        amount: Decimal::new(2990, 2),
        method: PaymentMethod::Pix,
        status: PaymentStatus::Pending,
        external_id: None,
        external_data: None,
        paid_at: None,
        created_at: now,
        updated_at: now,
    };
    overrides(&mut payment);
    payment
}
