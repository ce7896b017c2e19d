//! Case outcome prediction.

use actix_web::{web, HttpResponse};
use serde::Serialize;
use tracing::info;

use crate::auth::AuthContext;
use crate::error::AppError;
use crate::responder::{WinFactors, WinPredictionRequest};
use crate::AppState;
use crate::Result;

const WIN_PROBABILITY_CAP: f64 = 0.95;
const JUDGE_HISTORY_BONUS: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WinPrediction {
    pub win_probability: f64,
    #[serde(flatten)]
    pub factors: WinFactors,
}

/// Mean of the two strengths plus a flat judge bonus, capped and rounded to cents.
pub fn win_probability(evidence_strength: f64, precedent_support: f64) -> f64 {
    let base = (evidence_strength + precedent_support) / 2.0;
    let capped = (base + JUDGE_HISTORY_BONUS).min(WIN_PROBABILITY_CAP);
    (capped * 100.0).round() / 100.0
}

fn check_unit_interval(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AppError::validation(format!("{} must be between 0 and 1", name)))
    }
}

impl WinPredictionRequest {
    pub fn validate(&self) -> Result<()> {
        check_unit_interval("evidenceStrength", self.evidence_strength)?;
        check_unit_interval("precedentSupport", self.precedent_support)
    }
}

pub async fn predict_win_chance(
    auth: AuthContext,
    req: web::Json<WinPredictionRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    req.validate()?;

    let prediction = WinPrediction {
        win_probability: win_probability(req.evidence_strength, req.precedent_support),
        factors: state.responder.win_factors(&req).await?,
    };
    info!(
        "Win chance {} for {} case predicted for {}",
        prediction.win_probability, req.case_type, auth.user_id
    );
    Ok(HttpResponse::Ok().json(prediction))
}
