use std::fs::File;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{http::app_state::AppState, persistence::PostgresPersistence},
    infra::{config::AppConfig, db::init_db},
    use_cases::{
        payments::{PaymentRepo, PaymentUseCases},
        plans::{PlanRepo, PlanUseCases},
        subscriptions::{SubscriptionRepo, SubscriptionUseCases},
    },
};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let pool = init_db(&config.database_url).await?;
    let postgres_arc = Arc::new(PostgresPersistence::new(pool));

    let plan_use_cases = Arc::new(PlanUseCases::new(
        postgres_arc.clone() as Arc<dyn PlanRepo>
    ));

    let subscription_use_cases = Arc::new(SubscriptionUseCases::new(
        postgres_arc.clone() as Arc<dyn SubscriptionRepo>,
        postgres_arc.clone() as Arc<dyn PlanRepo>,
    ));

    let payment_use_cases = Arc::new(PaymentUseCases::new(
        postgres_arc.clone() as Arc<dyn PaymentRepo>,
        postgres_arc.clone() as Arc<dyn PlanRepo>,
        subscription_use_cases.clone(),
    ));

    Ok(AppState {
        config: Arc::new(config),
        plan_use_cases,
        subscription_use_cases,
        payment_use_cases,
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "subhub=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .pretty();

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
