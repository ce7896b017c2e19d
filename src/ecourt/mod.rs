//! eCourt case lookup and AI-assisted drafting for lawyers.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthContext;
use crate::db::NewDocumentGeneration;
use crate::error::AppError;
use crate::responder::{Case, CreateDraftRequest};
use crate::AppState;
use crate::Result;

pub const DRAFT_KIND: &str = "draft";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCasesQuery {
    pub crn_number: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListCasesResponse {
    pub cases: Vec<Case>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub id: String,
    pub case_id: String,
    pub content: String,
    pub compliance_issues: Vec<String>,
    pub suggestions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Query parameter first, then the CRN on the caller's account.
fn resolve_crn<'a>(query: &'a ListCasesQuery, auth: &'a AuthContext) -> Option<&'a str> {
    query
        .crn_number
        .as_deref()
        .map(str::trim)
        .filter(|crn| !crn.is_empty())
        .or_else(|| auth.crn_number.as_deref().filter(|crn| !crn.is_empty()))
}

pub async fn list_cases(
    auth: AuthContext,
    query: web::Query<ListCasesQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let crn_number =
        resolve_crn(&query, &auth).ok_or_else(|| AppError::validation("CRN number is required"))?;

    let cases = state.responder.list_cases(crn_number).await?;
    info!("Fetched {} cases for CRN {}", cases.len(), crn_number);
    Ok(HttpResponse::Ok().json(ListCasesResponse { cases }))
}

pub async fn create_draft(
    auth: AuthContext,
    req: web::Json<CreateDraftRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if req.case_id.trim().is_empty() || req.draft_type.trim().is_empty() {
        return Err(AppError::validation("Case ID and draft type are required"));
    }

    if let Some(template_id) = req.template_id {
        state
            .store
            .get_template(template_id)
            .await?
            .filter(|t| t.is_active)
            .ok_or_else(|| AppError::not_found(format!("Template {} not found", template_id)))?;
    }

    let now = Utc::now();
    let drafted = state.responder.draft(&req, now).await?;
    let id = format!("draft_{}", now.timestamp_millis());

    state
        .store
        .record_generation(&NewDocumentGeneration {
            user_id: auth.user_id,
            template_id: req.template_id,
            kind: DRAFT_KIND.to_string(),
            reference: id.clone(),
        })
        .await?;

    info!("Draft {} ({}) created by {}", id, req.draft_type, auth.user_id);
    Ok(HttpResponse::Ok().json(Draft {
        id,
        case_id: req.case_id.clone(),
        content: drafted.content,
        compliance_issues: drafted.compliance_issues,
        suggestions: drafted.suggestions,
        created_at: now,
    }))
}
