use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::db::models::{
    ActiveSubscription, CircleRate, NewCircleRate, NewDocumentGeneration, NewTemplate, Role,
    SubscriptionUpdate, Template, TemplateChanges, TemplateFilter, TemplateUsage, User, FREE_PLAN,
};
use crate::db::store::Store;
use crate::Result;

const USER_COLUMNS: &str = "id, email, password_hash, role, crn_number, first_name, last_name, \
     is_active, subscription_plan, subscription_discount_percent, subscription_expires_at, created_at";

const CIRCLE_RATE_COLUMNS: &str =
    "id, state, district, circle_rate, created_by, created_at, updated_at";

const TEMPLATE_COLUMNS: &str = "id, name, template_type, content, placeholders, state, district, \
     is_active, created_by, created_at, updated_at";

#[derive(FromRow)]
struct TemplateRow {
    id: i64,
    name: String,
    template_type: String,
    content: String,
    placeholders: Json<Vec<String>>,
    state: Option<String>,
    district: Option<String>,
    is_active: bool,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TemplateRow> for Template {
    fn from(row: TemplateRow) -> Self {
        Template {
            id: row.id,
            name: row.name,
            template_type: row.template_type,
            content: row.content,
            placeholders: row.placeholders.0,
            state: row.state,
            district: row.district,
            is_active: row.is_active,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Postgres-backed [`Store`].
pub struct DbOperations {
    pool: Arc<PgPool>,
}

impl DbOperations {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn new_with_options(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(self.pool.as_ref()).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub async fn begin_transaction(&self) -> Result<Transaction<'_, Postgres>> {
        Ok(self.pool.as_ref().begin().await?)
    }

    async fn create_user_with_transaction(
        &self,
        user: &User,
        transaction: &mut Transaction<'_, Postgres>,
    ) -> Result<User> {
        let query = format!(
            r#"
            INSERT INTO users (id, email, password_hash, role, crn_number, first_name, last_name,
                               is_active, subscription_plan, subscription_discount_percent,
                               subscription_expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role)
            .bind(&user.crn_number)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.is_active)
            .bind(&user.subscription_plan)
            .bind(user.subscription_discount_percent)
            .bind(user.subscription_expires_at)
            .bind(user.created_at)
            .fetch_one(&mut **transaction)
            .await?;

        Ok(user)
    }
}

#[async_trait]
impl Store for DbOperations {
    async fn create_user(&self, user: &User) -> Result<User> {
        let mut transaction = self.begin_transaction().await?;

        let result = self.create_user_with_transaction(user, &mut transaction).await;

        match result {
            Ok(user) => {
                transaction.commit().await?;
                Ok(user)
            }
            Err(e) => {
                transaction.rollback().await?;
                Err(e)
            }
        }
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(user)
    }

    async fn update_subscription(
        &self,
        user_id: Uuid,
        update: &SubscriptionUpdate,
    ) -> Result<Option<User>> {
        let query = format!(
            r#"
            UPDATE users
            SET subscription_plan = $2,
                subscription_discount_percent = $3,
                subscription_expires_at = $4
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .bind(&update.plan_id)
            .bind(update.discount_percent)
            .bind(update.expires_at)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(user)
    }

    async fn count_users_by_role(&self, role: Role) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn active_subscriptions(&self, now: DateTime<Utc>) -> Result<Vec<ActiveSubscription>> {
        let rows = sqlx::query_as::<_, ActiveSubscription>(
            r#"
            SELECT subscription_plan AS plan_id, subscription_discount_percent AS discount_percent
            FROM users
            WHERE subscription_plan <> $1 AND subscription_expires_at > $2
            "#,
        )
        .bind(FREE_PLAN)
        .bind(now)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn upsert_circle_rate(&self, rate: &NewCircleRate) -> Result<CircleRate> {
        let query = format!(
            r#"
            INSERT INTO circle_rates (state, district, circle_rate, created_by)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (state, district)
            DO UPDATE SET circle_rate = EXCLUDED.circle_rate, updated_at = NOW()
            RETURNING {CIRCLE_RATE_COLUMNS}
            "#
        );
        let rate = sqlx::query_as::<_, CircleRate>(&query)
            .bind(&rate.state)
            .bind(&rate.district)
            .bind(rate.circle_rate)
            .bind(rate.created_by)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(rate)
    }

    async fn get_circle_rate(&self, state: &str, district: &str) -> Result<Option<CircleRate>> {
        let query = format!(
            "SELECT {CIRCLE_RATE_COLUMNS} FROM circle_rates WHERE state = $1 AND district = $2"
        );
        let rate = sqlx::query_as::<_, CircleRate>(&query)
            .bind(state)
            .bind(district)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(rate)
    }

    async fn list_circle_rates(&self, state: Option<&str>) -> Result<Vec<CircleRate>> {
        let query = format!(
            r#"
            SELECT {CIRCLE_RATE_COLUMNS}
            FROM circle_rates
            WHERE ($1::text IS NULL OR state = $1)
            ORDER BY state, district
            "#
        );
        let rates = sqlx::query_as::<_, CircleRate>(&query)
            .bind(state)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rates)
    }

    async fn create_template(&self, template: &NewTemplate) -> Result<Template> {
        let query = format!(
            r#"
            INSERT INTO templates (name, template_type, content, placeholders, state, district, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TEMPLATE_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, TemplateRow>(&query)
            .bind(&template.name)
            .bind(&template.template_type)
            .bind(&template.content)
            .bind(Json(&template.placeholders))
            .bind(&template.state)
            .bind(&template.district)
            .bind(template.created_by)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn get_template(&self, id: i64) -> Result<Option<Template>> {
        let query = format!("SELECT {TEMPLATE_COLUMNS} FROM templates WHERE id = $1");
        let row = sqlx::query_as::<_, TemplateRow>(&query)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Template::from))
    }

    async fn list_active_templates(&self, filter: &TemplateFilter) -> Result<Vec<Template>> {
        let query = format!(
            r#"
            SELECT {TEMPLATE_COLUMNS}
            FROM templates
            WHERE is_active = TRUE
              AND ($1::text IS NULL OR state IS NULL OR state = $1)
              AND ($2::text IS NULL OR district IS NULL OR district = $2)
            ORDER BY created_at DESC, id DESC
            "#
        );
        let rows = sqlx::query_as::<_, TemplateRow>(&query)
            .bind(&filter.state)
            .bind(&filter.district)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Template::from).collect())
    }

    async fn update_template(&self, id: i64, changes: &TemplateChanges) -> Result<Option<Template>> {
        let query = format!(
            r#"
            UPDATE templates
            SET name = COALESCE($2, name),
                template_type = COALESCE($3, template_type),
                content = COALESCE($4, content),
                placeholders = COALESCE($5, placeholders),
                state = CASE WHEN $6 THEN $7 ELSE state END,
                district = CASE WHEN $8 THEN $9 ELSE district END,
                is_active = COALESCE($10, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TEMPLATE_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, TemplateRow>(&query)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.template_type)
            .bind(&changes.content)
            .bind(changes.placeholders.as_ref().map(Json))
            .bind(changes.state.is_some())
            .bind(changes.state.clone().flatten())
            .bind(changes.district.is_some())
            .bind(changes.district.clone().flatten())
            .bind(changes.is_active)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Template::from))
    }

    async fn record_generation(&self, generation: &NewDocumentGeneration) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO document_generations (user_id, template_id, kind, reference)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(generation.user_id)
        .bind(generation.template_id)
        .bind(&generation.kind)
        .bind(&generation.reference)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn count_generations(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM document_generations")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn top_templates(&self, limit: i64) -> Result<Vec<TemplateUsage>> {
        let usage = sqlx::query_as::<_, TemplateUsage>(
            r#"
            SELECT t.name AS name, COUNT(*) AS "usage"
            FROM document_generations g
            JOIN templates t ON t.id = g.template_id
            GROUP BY t.name
            ORDER BY "usage" DESC, t.name
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(usage)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
