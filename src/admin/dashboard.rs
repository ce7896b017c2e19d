use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::admin::subscriptions::find_plan;
use crate::db::{ActiveSubscription, Role, TemplateUsage};
use crate::AppState;
use crate::Result;

const TOP_TEMPLATES: i64 = 3;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: i64,
    pub total_lawyers: i64,
    pub active_subscriptions: i64,
    pub documents_generated: i64,
    pub top_templates: Vec<TemplateUsage>,
    pub revenue_this_month: f64,
}

/// Monthly revenue implied by the currently active subscriptions.
pub fn monthly_revenue(subscriptions: &[ActiveSubscription]) -> f64 {
    let total: f64 = subscriptions
        .iter()
        .filter_map(|sub| match find_plan(&sub.plan_id) {
            Some(plan) => Some(plan.monthly_revenue(sub.discount_percent)),
            None => {
                warn!("Active subscription on unknown plan '{}'", sub.plan_id);
                None
            }
        })
        .sum();
    (total * 100.0).round() / 100.0
}

pub async fn get_dashboard_stats(state: web::Data<AppState>) -> Result<HttpResponse> {
    let store = &state.store;
    let subscriptions = store.active_subscriptions(Utc::now()).await?;

    let stats = AdminStats {
        total_users: store.count_users_by_role(Role::User).await?,
        total_lawyers: store.count_users_by_role(Role::Lawyer).await?,
        active_subscriptions: subscriptions.len() as i64,
        documents_generated: store.count_generations().await?,
        top_templates: store.top_templates(TOP_TEMPLATES).await?,
        revenue_this_month: monthly_revenue(&subscriptions),
    };

    Ok(HttpResponse::Ok().json(stats))
}
