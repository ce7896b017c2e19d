//! Judge analysis and courtroom argument simulation (lawyers only).

use actix_web::{web, HttpResponse};
use tracing::info;

use crate::auth::AuthContext;
use crate::error::AppError;
use crate::responder::{AnalyzeJudgeRequest, SimulatorRequest};
use crate::AppState;
use crate::Result;

pub async fn analyze_judge(
    auth: AuthContext,
    req: web::Json<AnalyzeJudgeRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if req.judge_id.trim().is_empty() || req.case_type.trim().is_empty() {
        return Err(AppError::validation("Judge ID and case type are required"));
    }

    info!("Judge analysis for {} requested by {}", req.judge_id, auth.user_id);
    let analysis = state.responder.analyze_judge(&req).await?;
    Ok(HttpResponse::Ok().json(analysis))
}

pub async fn simulate_argument(
    auth: AuthContext,
    req: web::Json<SimulatorRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if req.argument.trim().is_empty() {
        return Err(AppError::validation("Argument is required"));
    }

    info!(
        "Simulating {:?} judge for {} ({} chars)",
        req.judge_profile,
        auth.user_id,
        req.argument.len()
    );
    let response = state.responder.simulate_argument(&req).await?;
    Ok(HttpResponse::Ok().json(response))
}
