use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

pub const FREE_PLAN: &str = "free";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Admin,
    Lawyer,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Lawyer => "lawyer",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub crn_number: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub subscription_plan: String,
    pub subscription_discount_percent: f64,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        email: String,
        password_hash: String,
        role: Role,
        crn_number: Option<String>,
        first_name: String,
        last_name: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            role,
            crn_number,
            first_name,
            last_name,
            is_active: true,
            subscription_plan: FREE_PLAN.to_string(),
            subscription_discount_percent: 0.0,
            subscription_expires_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn has_active_subscription(&self, now: DateTime<Utc>) -> bool {
        self.subscription_plan != FREE_PLAN
            && self.subscription_expires_at.map_or(false, |expires| expires > now)
    }
}

#[derive(Debug, Clone)]
pub struct SubscriptionUpdate {
    pub plan_id: String,
    pub discount_percent: f64,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ActiveSubscription {
    pub plan_id: String,
    pub discount_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CircleRate {
    pub id: i64,
    pub state: String,
    pub district: String,
    pub circle_rate: f64,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCircleRate {
    pub state: String,
    pub district: String,
    pub circle_rate: f64,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub template_type: String,
    pub content: String,
    pub placeholders: Vec<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Template {
    /// A template with no state applies everywhere; one with no district applies statewide.
    pub fn applies_to(&self, filter: &TemplateFilter) -> bool {
        let state_ok = match (&filter.state, &self.state) {
            (Some(wanted), Some(scoped)) => wanted == scoped,
            _ => true,
        };
        let district_ok = match (&filter.district, &self.district) {
            (Some(wanted), Some(scoped)) => wanted == scoped,
            _ => true,
        };
        state_ok && district_ok
    }
}

#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub name: String,
    pub template_type: String,
    pub content: String,
    pub placeholders: Vec<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub created_by: Uuid,
}

/// Partial edit. `None` leaves the column untouched; `Some(None)` clears a scope column.
#[derive(Debug, Clone, Default)]
pub struct TemplateChanges {
    pub name: Option<String>,
    pub template_type: Option<String>,
    pub content: Option<String>,
    pub placeholders: Option<Vec<String>>,
    pub state: Option<Option<String>>,
    pub district: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateFilter {
    pub state: Option<String>,
    pub district: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DocumentGeneration {
    pub id: i64,
    pub user_id: Uuid,
    pub template_id: Option<i64>,
    pub kind: String,
    pub reference: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDocumentGeneration {
    pub user_id: Uuid,
    pub template_id: Option<i64>,
    pub kind: String,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct TemplateUsage {
    pub name: String,
    pub usage: i64,
}
