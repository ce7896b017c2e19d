//! In-process [`Store`] used by tests and by `database.backend = "memory"`.
//!
//! Every check-then-write happens under one write lock, which gives the same
//! uniqueness and upsert guarantees the Postgres constraints provide.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::models::{
    ActiveSubscription, CircleRate, DocumentGeneration, NewCircleRate, NewDocumentGeneration,
    NewTemplate, Role, SubscriptionUpdate, Template, TemplateChanges, TemplateFilter,
    TemplateUsage, User,
};
use crate::db::store::Store;
use crate::error::DatabaseError;
use crate::Result;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    circle_rates: BTreeMap<(String, String), CircleRate>,
    templates: BTreeMap<i64, Template>,
    generations: Vec<DocumentGeneration>,
    next_circle_rate_id: i64,
    next_template_id: i64,
    next_generation_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a user's active flag. There is no HTTP surface for this; tests and
    /// operator tooling use it to exercise deactivated accounts.
    pub async fn set_user_active(&self, user_id: Uuid, active: bool) -> bool {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&user_id) {
            Some(user) => {
                user.is_active = active;
                true
            }
            None => false,
        }
    }

    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: &User) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|existing| existing.email == user.email) {
            return Err(DatabaseError::Duplicate.into());
        }
        tables.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|user| user.email == email).cloned())
    }

    async fn update_subscription(
        &self,
        user_id: Uuid,
        update: &SubscriptionUpdate,
    ) -> Result<Option<User>> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(&user_id).map(|user| {
            user.subscription_plan = update.plan_id.clone();
            user.subscription_discount_percent = update.discount_percent;
            user.subscription_expires_at = Some(update.expires_at);
            user.clone()
        }))
    }

    async fn count_users_by_role(&self, role: Role) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().filter(|user| user.role == role).count() as i64)
    }

    async fn active_subscriptions(&self, now: DateTime<Utc>) -> Result<Vec<ActiveSubscription>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .filter(|user| user.has_active_subscription(now))
            .map(|user| ActiveSubscription {
                plan_id: user.subscription_plan.clone(),
                discount_percent: user.subscription_discount_percent,
            })
            .collect())
    }

    async fn upsert_circle_rate(&self, rate: &NewCircleRate) -> Result<CircleRate> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let key = (rate.state.clone(), rate.district.clone());

        if let Some(existing) = tables.circle_rates.get_mut(&key) {
            existing.circle_rate = rate.circle_rate;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let id = next_id(&mut tables.next_circle_rate_id);
        let created = CircleRate {
            id,
            state: rate.state.clone(),
            district: rate.district.clone(),
            circle_rate: rate.circle_rate,
            created_by: rate.created_by,
            created_at: now,
            updated_at: now,
        };
        tables.circle_rates.insert(key, created.clone());
        Ok(created)
    }

    async fn get_circle_rate(&self, state: &str, district: &str) -> Result<Option<CircleRate>> {
        let tables = self.tables.read().await;
        Ok(tables
            .circle_rates
            .get(&(state.to_string(), district.to_string()))
            .cloned())
    }

    async fn list_circle_rates(&self, state: Option<&str>) -> Result<Vec<CircleRate>> {
        let tables = self.tables.read().await;
        // BTreeMap keyed on (state, district) already iterates in list order
        Ok(tables
            .circle_rates
            .values()
            .filter(|rate| state.map_or(true, |wanted| rate.state == wanted))
            .cloned()
            .collect())
    }

    async fn create_template(&self, template: &NewTemplate) -> Result<Template> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let id = next_id(&mut tables.next_template_id);
        let created = Template {
            id,
            name: template.name.clone(),
            template_type: template.template_type.clone(),
            content: template.content.clone(),
            placeholders: template.placeholders.clone(),
            state: template.state.clone(),
            district: template.district.clone(),
            is_active: true,
            created_by: template.created_by,
            created_at: now,
            updated_at: now,
        };
        tables.templates.insert(id, created.clone());
        Ok(created)
    }

    async fn get_template(&self, id: i64) -> Result<Option<Template>> {
        Ok(self.tables.read().await.templates.get(&id).cloned())
    }

    async fn list_active_templates(&self, filter: &TemplateFilter) -> Result<Vec<Template>> {
        let tables = self.tables.read().await;
        let mut templates: Vec<Template> = tables
            .templates
            .values()
            .filter(|template| template.is_active && template.applies_to(filter))
            .cloned()
            .collect();
        templates.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(templates)
    }

    async fn update_template(&self, id: i64, changes: &TemplateChanges) -> Result<Option<Template>> {
        let mut tables = self.tables.write().await;
        Ok(tables.templates.get_mut(&id).map(|template| {
            if let Some(name) = &changes.name {
                template.name = name.clone();
            }
            if let Some(template_type) = &changes.template_type {
                template.template_type = template_type.clone();
            }
            if let Some(content) = &changes.content {
                template.content = content.clone();
            }
            if let Some(placeholders) = &changes.placeholders {
                template.placeholders = placeholders.clone();
            }
            if let Some(state) = &changes.state {
                template.state = state.clone();
            }
            if let Some(district) = &changes.district {
                template.district = district.clone();
            }
            if let Some(is_active) = changes.is_active {
                template.is_active = is_active;
            }
            template.updated_at = Utc::now();
            template.clone()
        }))
    }

    async fn record_generation(&self, generation: &NewDocumentGeneration) -> Result<()> {
        let mut tables = self.tables.write().await;
        let id = next_id(&mut tables.next_generation_id);
        tables.generations.push(DocumentGeneration {
            id,
            user_id: generation.user_id,
            template_id: generation.template_id,
            kind: generation.kind.clone(),
            reference: generation.reference.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn count_generations(&self) -> Result<i64> {
        Ok(self.tables.read().await.generations.len() as i64)
    }

    async fn top_templates(&self, limit: i64) -> Result<Vec<TemplateUsage>> {
        let tables = self.tables.read().await;
        let mut counts: HashMap<&str, i64> = HashMap::new();
        for generation in &tables.generations {
            let name = generation
                .template_id
                .and_then(|id| tables.templates.get(&id))
                .map(|template| template.name.as_str());
            if let Some(name) = name {
                *counts.entry(name).or_insert(0) += 1;
            }
        }

        let mut usage: Vec<TemplateUsage> = counts
            .into_iter()
            .map(|(name, usage)| TemplateUsage { name: name.to_string(), usage })
            .collect();
        usage.sort_by(|a, b| b.usage.cmp(&a.usage).then_with(|| a.name.cmp(&b.name)));
        usage.truncate(limit.max(0) as usize);
        Ok(usage)
    }
}
