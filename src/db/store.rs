//! Storage abstraction shared by the Postgres and in-memory backends.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::models::{
    ActiveSubscription, CircleRate, NewCircleRate, NewDocumentGeneration, NewTemplate, Role,
    SubscriptionUpdate, Template, TemplateChanges, TemplateFilter, TemplateUsage, User,
};
use crate::Result;

#[async_trait]
pub trait Store: Send + Sync {
    // =========================================================================
    // Users
    // =========================================================================

    /// Insert a user. A taken email fails with `DatabaseError::Duplicate`.
    async fn create_user(&self, user: &User) -> Result<User>;

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Lookup by normalized (trimmed, lowercased) email.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Returns `None` when no user has this id.
    async fn update_subscription(
        &self,
        user_id: Uuid,
        update: &SubscriptionUpdate,
    ) -> Result<Option<User>>;

    async fn count_users_by_role(&self, role: Role) -> Result<i64>;

    async fn active_subscriptions(&self, now: DateTime<Utc>) -> Result<Vec<ActiveSubscription>>;

    // =========================================================================
    // Circle rates
    // =========================================================================

    /// Atomic insert-or-update keyed on (state, district).
    async fn upsert_circle_rate(&self, rate: &NewCircleRate) -> Result<CircleRate>;

    async fn get_circle_rate(&self, state: &str, district: &str) -> Result<Option<CircleRate>>;

    /// Ordered by state, then district.
    async fn list_circle_rates(&self, state: Option<&str>) -> Result<Vec<CircleRate>>;

    // =========================================================================
    // Templates
    // =========================================================================

    async fn create_template(&self, template: &NewTemplate) -> Result<Template>;

    async fn get_template(&self, id: i64) -> Result<Option<Template>>;

    /// Active templates only, newest first.
    async fn list_active_templates(&self, filter: &TemplateFilter) -> Result<Vec<Template>>;

    async fn update_template(&self, id: i64, changes: &TemplateChanges) -> Result<Option<Template>>;

    // =========================================================================
    // Document generations
    // =========================================================================

    async fn record_generation(&self, generation: &NewDocumentGeneration) -> Result<()>;

    async fn count_generations(&self) -> Result<i64>;

    async fn top_templates(&self, limit: i64) -> Result<Vec<TemplateUsage>>;

    async fn close(&self) {}
}
