use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthContext;
use crate::db::{NewTemplate, Template, TemplateChanges, TemplateFilter};
use crate::error::AppError;
use crate::AppState;
use crate::Result;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub template_type: String,
    pub content: String,
    #[serde(default)]
    pub placeholders: Vec<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTemplateRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub template_type: Option<String>,
    pub content: Option<String>,
    pub placeholders: Option<Vec<String>>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ListTemplatesResponse {
    pub templates: Vec<Template>,
}

fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::validation(format!("Template {} is required", field)));
    }
    Ok(value.to_string())
}

/// Blank scope values mean "unscoped".
fn scope(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

fn placeholders(values: &[String]) -> Result<Vec<String>> {
    values
        .iter()
        .map(|p| {
            let p = p.trim();
            if p.is_empty() {
                Err(AppError::validation("Template placeholders must not be blank"))
            } else {
                Ok(p.to_string())
            }
        })
        .collect()
}

fn check_scope(state: Option<&str>, district: Option<&str>) -> Result<()> {
    if district.is_some() && state.is_none() {
        return Err(AppError::validation("A district-scoped template also needs a state"));
    }
    Ok(())
}

impl CreateTemplateRequest {
    pub fn into_new_template(self, auth: &AuthContext) -> Result<NewTemplate> {
        let state = scope(self.state.as_deref());
        let district = scope(self.district.as_deref());
        check_scope(state.as_deref(), district.as_deref())?;

        Ok(NewTemplate {
            name: required("name", &self.name)?,
            template_type: required("type", &self.template_type)?,
            content: required("content", &self.content)?,
            placeholders: placeholders(&self.placeholders)?,
            state,
            district,
            created_by: auth.user_id,
        })
    }
}

impl UpdateTemplateRequest {
    /// Validate against the stored template so the merged scope stays consistent.
    /// A blank `state` or `district` clears that scope.
    pub fn into_changes(self, existing: &Template) -> Result<TemplateChanges> {
        let state = self.state.as_deref().map(|v| scope(Some(v)));
        let district = self.district.as_deref().map(|v| scope(Some(v)));
        check_scope(
            state.clone().unwrap_or_else(|| existing.state.clone()).as_deref(),
            district.clone().unwrap_or_else(|| existing.district.clone()).as_deref(),
        )?;

        Ok(TemplateChanges {
            name: self.name.as_deref().map(|v| required("name", v)).transpose()?,
            template_type: self
                .template_type
                .as_deref()
                .map(|v| required("type", v))
                .transpose()?,
            content: self.content.as_deref().map(|v| required("content", v)).transpose()?,
            placeholders: self.placeholders.as_deref().map(placeholders).transpose()?,
            state,
            district,
            is_active: self.is_active,
        })
    }
}

fn template_not_found(id: i64) -> AppError {
    AppError::not_found(format!("Template {} not found", id))
}

pub async fn create_template(
    auth: AuthContext,
    req: web::Json<CreateTemplateRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let new_template = req.into_inner().into_new_template(&auth)?;
    let template = state.store.create_template(&new_template).await?;

    info!("Template {} ({}) created by {}", template.id, template.name, auth.user_id);
    Ok(HttpResponse::Created().json(template))
}

pub async fn list_templates(
    query: web::Query<TemplateFilter>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let filter = TemplateFilter {
        state: scope(query.state.as_deref()),
        district: scope(query.district.as_deref()),
    };
    let templates = state.store.list_active_templates(&filter).await?;
    Ok(HttpResponse::Ok().json(ListTemplatesResponse { templates }))
}

pub async fn get_template(
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let template = state
        .store
        .get_template(id)
        .await?
        .filter(|t| t.is_active)
        .ok_or_else(|| template_not_found(id))?;
    Ok(HttpResponse::Ok().json(template))
}

pub async fn update_template(
    auth: AuthContext,
    path: web::Path<i64>,
    req: web::Json<UpdateTemplateRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let existing = state
        .store
        .get_template(id)
        .await?
        .ok_or_else(|| template_not_found(id))?;

    let changes = req.into_inner().into_changes(&existing)?;
    let template = state
        .store
        .update_template(id, &changes)
        .await?
        .ok_or_else(|| template_not_found(id))?;

    info!("Template {} updated by {}", id, auth.user_id);
    Ok(HttpResponse::Ok().json(template))
}

/// Soft delete: the row stays for generation history but drops out of listings.
pub async fn delete_template(
    auth: AuthContext,
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let changes = TemplateChanges {
        is_active: Some(false),
        ..Default::default()
    };
    state
        .store
        .update_template(id, &changes)
        .await?
        .ok_or_else(|| template_not_found(id))?;

    info!("Template {} deactivated by {}", id, auth.user_id);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "id": id
    })))
}
