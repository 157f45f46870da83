use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::subscription::{Subscription, SubscriptionStatus},
    use_cases::subscriptions::{NewSubscription, SubscriptionRepo, SubscriptionUpdate},
};

const SELECT_COLS: &str = r#"
    id, user_id, plan_id, status, starts_at, ends_at, cancelled_at, created_at, updated_at
"#;

fn row_to_subscription(row: sqlx::postgres::PgRow) -> Subscription {
    Subscription {
        id: row.get("id"),
        user_id: row.get("user_id"),
        plan_id: row.get("plan_id"),
        status: row.get("status"),
        starts_at: row.get("starts_at"),
        ends_at: row.get("ends_at"),
        cancelled_at: row.get("cancelled_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl SubscriptionRepo for PostgresPersistence {
    async fn create(&self, input: &NewSubscription) -> AppResult<Subscription> {
        let id = Uuid::new_v4();
        let row = sqlx::query(&format!(
            r#"INSERT INTO subscriptions (id, user_id, plan_id, status, starts_at, ends_at)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {}"#,
            SELECT_COLS
        ))
        .bind(id)
        .bind(input.user_id)
        .bind(input.plan_id)
        .bind(input.status)
        .bind(input.starts_at)
        .bind(input.ends_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row_to_subscription(row))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Subscription>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE id = $1",
            SELECT_COLS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_subscription))
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Subscription>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE user_id = $1 ORDER BY created_at DESC",
            SELECT_COLS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_subscription).collect())
    }

    async fn list_active_by_user(&self, user_id: Uuid) -> AppResult<Vec<Subscription>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE user_id = $1 AND status = 'active' ORDER BY created_at DESC",
            SELECT_COLS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_subscription).collect())
    }

    async fn list(&self, status: Option<SubscriptionStatus>) -> AppResult<Vec<Subscription>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!(
                    "SELECT {} FROM subscriptions WHERE status = $1 ORDER BY created_at DESC",
                    SELECT_COLS
                ))
                .bind(status)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM subscriptions ORDER BY created_at DESC",
                    SELECT_COLS
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_subscription).collect())
    }

    async fn update(&self, id: Uuid, update: &SubscriptionUpdate) -> AppResult<Subscription> {
        let row = sqlx::query(&format!(
            r#"UPDATE subscriptions SET
                   status = COALESCE($2, status),
                   ends_at = COALESCE($3, ends_at),
                   cancelled_at = COALESCE($4, cancelled_at),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING {}"#,
            SELECT_COLS
        ))
        .bind(id)
        .bind(update.status)
        .bind(update.ends_at)
        .bind(update.cancelled_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        row.map(row_to_subscription)
            .ok_or(AppError::NotFound("Subscription not found".into()))
    }

    async fn exists_active(&self, user_id: Uuid, plan_id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM subscriptions WHERE user_id = $1 AND plan_id = $2 AND status = 'active')",
        )
        .bind(user_id)
        .bind(plan_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(exists)
    }

    async fn list_expired_active(&self, now: DateTime<Utc>) -> AppResult<Vec<Subscription>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE status = 'active' AND ends_at < $1",
            SELECT_COLS
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_subscription).collect())
    }
}
