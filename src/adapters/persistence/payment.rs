use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::payment::{Payment, PaymentStatus},
    use_cases::payments::{NewPayment, PaymentRepo, PaymentUpdate},
};

const SELECT_COLS: &str = r#"
    id, user_id, subscription_id, amount, method, status,
    external_id, external_data, paid_at, created_at, updated_at
"#;

fn row_to_payment(row: sqlx::postgres::PgRow) -> Payment {
    Payment {
        id: row.get("id"),
        user_id: row.get("user_id"),
        subscription_id: row.get("subscription_id"),
        amount: row.get("amount"),
        method: row.get("method"),
        status: row.get("status"),
        external_id: row.get("external_id"),
        external_data: row.get("external_data"),
        paid_at: row.get("paid_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl PaymentRepo for PostgresPersistence {
    async fn create(&self, input: &NewPayment) -> AppResult<Payment> {
        let id = Uuid::new_v4();
        let row = sqlx::query(&format!(
            r#"INSERT INTO payments (id, user_id, subscription_id, amount, method, status)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {}"#,
            SELECT_COLS
        ))
        .bind(id)
        .bind(input.user_id)
        .bind(input.subscription_id)
        .bind(input.amount)
        .bind(input.method)
        .bind(input.status)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row_to_payment(row))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Payment>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM payments WHERE id = $1",
            SELECT_COLS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_payment))
    }

    async fn get_by_external_id(&self, external_id: &str) -> AppResult<Option<Payment>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM payments WHERE external_id = $1",
            SELECT_COLS
        ))
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_payment))
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Payment>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM payments WHERE user_id = $1 ORDER BY created_at DESC",
            SELECT_COLS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_payment).collect())
    }

    async fn list_by_subscription(&self, subscription_id: Uuid) -> AppResult<Vec<Payment>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM payments WHERE subscription_id = $1 ORDER BY created_at DESC",
            SELECT_COLS
        ))
        .bind(subscription_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_payment).collect())
    }

    async fn list(&self, status: Option<PaymentStatus>) -> AppResult<Vec<Payment>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!(
                    "SELECT {} FROM payments WHERE status = $1 ORDER BY created_at DESC",
                    SELECT_COLS
                ))
                .bind(status)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM payments ORDER BY created_at DESC",
                    SELECT_COLS
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_payment).collect())
    }

    async fn update(&self, id: Uuid, update: &PaymentUpdate) -> AppResult<Payment> {
        let row = sqlx::query(&format!(
            r#"UPDATE payments SET
                   status = COALESCE($2, status),
                   external_id = COALESCE($3, external_id),
                   external_data = COALESCE($4, external_data),
                   paid_at = COALESCE($5, paid_at),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING {}"#,
            SELECT_COLS
        ))
        .bind(id)
        .bind(update.status)
        .bind(&update.external_id)
        .bind(&update.external_data)
        .bind(update.paid_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        row.map(row_to_payment)
            .ok_or(AppError::NotFound("Payment not found".into()))
    }

    async fn count_by_status(&self, status: PaymentStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(count)
    }

    async fn total_revenue(&self) -> AppResult<Decimal> {
        let revenue: Option<Decimal> = sqlx::query_scalar(
            "SELECT SUM(amount) FROM payments WHERE status = 'approved'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(revenue.unwrap_or_default())
    }
}
