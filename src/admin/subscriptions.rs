use actix_web::{web, HttpResponse};
use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::db::SubscriptionUpdate;
use crate::error::AppError;
use crate::AppState;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanDuration {
    Weekly,
    Monthly,
    Yearly,
}

impl PlanDuration {
    pub fn expires_at(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            PlanDuration::Weekly => from.checked_add_signed(Duration::days(7)),
            PlanDuration::Monthly => from.checked_add_months(Months::new(1)),
            PlanDuration::Yearly => from.checked_add_months(Months::new(12)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanAudience {
    User,
    Lawyer,
    Enterprise,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    pub id: &'static str,
    pub name: &'static str,
    /// Rupees per `duration`.
    pub price: f64,
    pub duration: PlanDuration,
    pub features: &'static [&'static str],
    /// `None` means unlimited.
    pub document_limit: Option<u32>,
    pub user_type: PlanAudience,
}

impl SubscriptionPlan {
    /// Price charged after applying a percentage discount.
    pub fn discounted_price(&self, discount_percent: f64) -> f64 {
        round2(self.price * (1.0 - discount_percent / 100.0))
    }

    /// Discounted price expressed per month.
    pub fn monthly_revenue(&self, discount_percent: f64) -> f64 {
        let charged = self.price * (1.0 - discount_percent / 100.0);
        match self.duration {
            PlanDuration::Weekly => charged * 52.0 / 12.0,
            PlanDuration::Monthly => charged,
            PlanDuration::Yearly => charged / 12.0,
        }
    }
}

pub const PLANS: &[SubscriptionPlan] = &[
    SubscriptionPlan {
        id: "free",
        name: "Free",
        price: 0.0,
        duration: PlanDuration::Weekly,
        features: &["Basic templates", "5 documents per week"],
        document_limit: Some(5),
        user_type: PlanAudience::User,
    },
    SubscriptionPlan {
        id: "lawyer-basic",
        name: "Lawyer Basic",
        price: 2999.0,
        duration: PlanDuration::Monthly,
        features: &["All templates", "Malkiyat calculator", "eCourt case sync"],
        document_limit: Some(50),
        user_type: PlanAudience::Lawyer,
    },
    SubscriptionPlan {
        id: "lawyer-pro",
        name: "Lawyer Pro",
        price: 4999.0,
        duration: PlanDuration::Monthly,
        features: &[
            "Unlimited documents",
            "Judge analysis",
            "Argument simulator",
            "Win predictor",
        ],
        document_limit: None,
        user_type: PlanAudience::Lawyer,
    },
    SubscriptionPlan {
        id: "enterprise",
        name: "Enterprise",
        price: 19999.0,
        duration: PlanDuration::Monthly,
        features: &["Everything in Lawyer Pro", "Multiple seats", "Priority support"],
        document_limit: None,
        user_type: PlanAudience::Enterprise,
    },
];

pub fn find_plan(id: &str) -> Option<&'static SubscriptionPlan> {
    PLANS.iter().find(|plan| plan.id == id)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubscriptionRequest {
    pub user_id: Uuid,
    pub plan_id: String,
    #[serde(default)]
    pub discount_percent: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub success: bool,
    pub plan_id: String,
    pub expires_at: DateTime<Utc>,
    pub amount_charged: f64,
}

#[derive(Debug, Serialize)]
pub struct ListPlansResponse {
    pub plans: &'static [SubscriptionPlan],
}

pub async fn update_subscription(
    req: web::Json<UpdateSubscriptionRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let plan = find_plan(req.plan_id.trim())
        .ok_or_else(|| AppError::validation(format!("Unknown plan '{}'", req.plan_id)))?;

    let discount = req.discount_percent.unwrap_or(0.0);
    if !(0.0..=100.0).contains(&discount) {
        return Err(AppError::validation("Discount must be between 0 and 100 percent"));
    }

    let expires_at = plan
        .duration
        .expires_at(Utc::now())
        .ok_or_else(|| AppError::InternalError("subscription expiry out of range".into()))?;

    let update = SubscriptionUpdate {
        plan_id: plan.id.to_string(),
        discount_percent: discount,
        expires_at,
    };
    state
        .store
        .update_subscription(req.user_id, &update)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", req.user_id)))?;

    info!(
        "User {} moved to plan {} ({}% off) until {}",
        req.user_id, plan.id, discount, expires_at
    );

    Ok(HttpResponse::Ok().json(SubscriptionResponse {
        success: true,
        plan_id: plan.id.to_string(),
        expires_at,
        amount_charged: plan.discounted_price(discount),
    }))
}

pub async fn list_plans() -> HttpResponse {
    HttpResponse::Ok().json(ListPlansResponse { plans: PLANS })
}
