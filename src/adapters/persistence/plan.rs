use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::plan::Plan,
    use_cases::plans::{CreatePlanInput, PlanRepo, UpdatePlanInput},
};

const SELECT_COLS: &str = r#"
    id, name, description, price, duration_days, features, is_active, created_at, updated_at
"#;

fn row_to_plan(row: sqlx::postgres::PgRow) -> Plan {
    let features_json: serde_json::Value = row.get("features");
    let features: Vec<String> = serde_json::from_value(features_json).unwrap_or_default();

    Plan {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        price: row.get("price"),
        duration_days: row.get("duration_days"),
        features,
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl PlanRepo for PostgresPersistence {
    async fn create(&self, input: &CreatePlanInput) -> AppResult<Plan> {
        let id = Uuid::new_v4();
        let features_json = serde_json::to_value(&input.features).unwrap_or(serde_json::json!([]));

        let row = sqlx::query(&format!(
            r#"INSERT INTO plans (id, name, description, price, duration_days, features, is_active)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {}"#,
            SELECT_COLS
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.duration_days)
        .bind(features_json)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row_to_plan(row))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Plan>> {
        let row = sqlx::query(&format!("SELECT {} FROM plans WHERE id = $1", SELECT_COLS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(row.map(row_to_plan))
    }

    async fn list(&self, active_only: bool) -> AppResult<Vec<Plan>> {
        let query = if active_only {
            format!(
                "SELECT {} FROM plans WHERE is_active = true ORDER BY price, created_at",
                SELECT_COLS
            )
        } else {
            format!("SELECT {} FROM plans ORDER BY price, created_at", SELECT_COLS)
        };
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_plan).collect())
    }

    async fn update(&self, id: Uuid, input: &UpdatePlanInput) -> AppResult<Plan> {
        let features_json = input
            .features
            .as_ref()
            .map(|f| serde_json::to_value(f).unwrap_or(serde_json::json!([])));

        let row = sqlx::query(&format!(
            r#"UPDATE plans SET
                   name = COALESCE($2, name),
                   description = COALESCE($3, description),
                   price = COALESCE($4, price),
                   duration_days = COALESCE($5, duration_days),
                   features = COALESCE($6, features),
                   is_active = COALESCE($7, is_active),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING {}"#,
            SELECT_COLS
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.duration_days)
        .bind(features_json)
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        row.map(row_to_plan)
            .ok_or(AppError::NotFound("Plan not found".into()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM plans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Plan not found".into()));
        }
        Ok(())
    }

    async fn count_active_subscriptions(&self, plan_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM subscriptions WHERE plan_id = $1 AND status = 'active'",
        )
        .bind(plan_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(count)
    }
}
