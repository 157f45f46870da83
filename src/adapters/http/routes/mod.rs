pub mod payments;
pub mod plans;
pub mod subscriptions;
pub mod webhooks;

use axum::Router;

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/plans", plans::router())
        .nest("/subscriptions", subscriptions::router())
        .nest("/payments", payments::router())
        .nest("/webhooks", webhooks::router())
}
