//! Test app state builder for HTTP-level testing.
//!
//! Creates an `AppState` wired to in-memory repositories, handing the repos
//! back so tests can seed data and assert on stored state.

use std::sync::Arc;

use axum::http::HeaderValue;

use crate::{
    adapters::http::app_state::AppState,
    domain::entities::{payment::Payment, plan::Plan, subscription::Subscription},
    infra::config::AppConfig,
    test_utils::{InMemoryPaymentRepo, InMemoryPlanRepo, InMemorySubscriptionRepo},
    use_cases::{
        payments::{PaymentRepo, PaymentUseCases},
        plans::{PlanRepo, PlanUseCases},
        subscriptions::{SubscriptionRepo, SubscriptionUseCases},
    },
};

fn test_config() -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        database_url: String::new(),
        cors_origin: HeaderValue::from_static("http://localhost:3000"),
        sweep_interval_secs: 3600,
    }
}

#[derive(Default)]
pub struct TestAppStateBuilder {
    plans: Vec<Plan>,
    subscriptions: Vec<Subscription>,
    payments: Vec<Payment>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plan(mut self, plan: Plan) -> Self {
        self.plans.push(plan);
        self
    }

    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscriptions.push(subscription);
        self
    }

    pub fn with_payment(mut self, payment: Payment) -> Self {
        self.payments.push(payment);
        self
    }

    pub fn build(
        self,
    ) -> (
        AppState,
        Arc<InMemoryPlanRepo>,
        Arc<InMemorySubscriptionRepo>,
        Arc<InMemoryPaymentRepo>,
    ) {
        let plan_repo = Arc::new(InMemoryPlanRepo::new());
        let subscription_repo = Arc::new(InMemorySubscriptionRepo::new());
        let payment_repo = Arc::new(InMemoryPaymentRepo::new());

        for plan in self.plans {
            plan_repo.insert(plan);
        }
        for subscription in self.subscriptions {
            subscription_repo.insert(subscription);
        }
        for payment in self.payments {
            payment_repo.insert(payment);
        }

        let plan_use_cases = Arc::new(PlanUseCases::new(
            plan_repo.clone() as Arc<dyn PlanRepo>
        ));
        let subscription_use_cases = Arc::new(SubscriptionUseCases::new(
            subscription_repo.clone() as Arc<dyn SubscriptionRepo>,
            plan_repo.clone() as Arc<dyn PlanRepo>,
        ));
        let payment_use_cases = Arc::new(PaymentUseCases::new(
            payment_repo.clone() as Arc<dyn PaymentRepo>,
            plan_repo.clone() as Arc<dyn PlanRepo>,
            subscription_use_cases.clone(),
        ));

        let app_state = AppState {
            config: Arc::new(test_config()),
            plan_use_cases,
            subscription_use_cases,
            payment_use_cases,
        };

        (app_state, plan_repo, subscription_repo, payment_repo)
    }
}
