use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::auth::AuthContext;
use crate::error::AppError;
use crate::AppState;
use crate::Result;

/// Rate per unit area used when neither the caller nor the store has one.
pub const DEFAULT_CIRCLE_RATE: f64 = 50_000.0;
pub const STAMP_DUTY_RATE: f64 = 0.05;
pub const REGISTRATION_FEE_RATE: f64 = 0.01;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MalkiyatCalculationRequest {
    pub land_area: f64,
    pub state: String,
    pub district: String,
    #[serde(default)]
    pub circle_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MalkiyatCalculation {
    pub land_value: f64,
    pub stamp_duty: f64,
    pub registration_fee: f64,
    pub total_charges: f64,
    pub circle_rate: f64,
}

impl MalkiyatCalculation {
    pub fn compute(land_area: f64, circle_rate: f64) -> Self {
        let land_value = land_area * circle_rate;
        let stamp_duty = land_value * STAMP_DUTY_RATE;
        let registration_fee = land_value * REGISTRATION_FEE_RATE;

        Self {
            land_value,
            stamp_duty,
            registration_fee,
            total_charges: land_value + stamp_duty + registration_fee,
            circle_rate,
        }
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

pub async fn calculate_malkiyat(
    auth: AuthContext,
    req: web::Json<MalkiyatCalculationRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !positive(req.land_area) {
        return Err(AppError::validation("Land area must be a positive number"));
    }

    let circle_rate = match req.circle_rate {
        Some(rate) if positive(rate) => rate,
        Some(_) => return Err(AppError::validation("Circle rate must be a positive number")),
        None => match state
            .store
            .get_circle_rate(req.state.trim(), req.district.trim())
            .await?
        {
            Some(stored) => stored.circle_rate,
            None => {
                debug!(
                    "No circle rate stored for {}/{}, using default",
                    req.state, req.district
                );
                DEFAULT_CIRCLE_RATE
            }
        },
    };

    let calculation = MalkiyatCalculation::compute(req.land_area, circle_rate);
    if !calculation.total_charges.is_finite() {
        return Err(AppError::validation("Land area and circle rate are too large to value"));
    }
    info!(
        "Malkiyat for {}/{} computed by {}: total {}",
        req.state, req.district, auth.user_id, calculation.total_charges
    );
    Ok(HttpResponse::Ok().json(calculation))
}
