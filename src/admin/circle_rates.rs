use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthContext;
use crate::db::{CircleRate, NewCircleRate};
use crate::error::AppError;
use crate::AppState;
use crate::Result;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCircleRateRequest {
    pub state: String,
    pub district: String,
    pub circle_rate: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct CircleRateQuery {
    pub state: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListCircleRatesResponse {
    pub rates: Vec<CircleRate>,
}

impl CreateCircleRateRequest {
    fn validate(&self) -> Result<()> {
        if self.state.trim().is_empty() || self.district.trim().is_empty() {
            return Err(AppError::validation("State and district are required"));
        }
        if !self.circle_rate.is_finite() || self.circle_rate <= 0.0 {
            return Err(AppError::validation("Circle rate must be a positive number"));
        }
        Ok(())
    }
}

/// Insert or overwrite the rate for a (state, district) pair.
pub async fn create_circle_rate(
    auth: AuthContext,
    req: web::Json<CreateCircleRateRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    req.validate()?;

    let rate = state
        .store
        .upsert_circle_rate(&NewCircleRate {
            state: req.state.trim().to_string(),
            district: req.district.trim().to_string(),
            circle_rate: req.circle_rate,
            created_by: auth.user_id,
        })
        .await?;

    info!(
        "Circle rate for {}/{} set to {} by {}",
        rate.state, rate.district, rate.circle_rate, auth.user_id
    );
    Ok(HttpResponse::Ok().json(rate))
}

pub async fn list_circle_rates(
    query: web::Query<CircleRateQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let filter = query.state.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let rates = state.store.list_circle_rates(filter).await?;
    Ok(HttpResponse::Ok().json(ListCircleRatesResponse { rates }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn request(state: &str, district: &str, circle_rate: f64) -> CreateCircleRateRequest {
        CreateCircleRateRequest {
            state: state.into(),
            district: district.into(),
            circle_rate,
        }
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        for bad in [
            request("", "Pune", 100.0),
            request("MH", "  ", 100.0),
            request("MH", "Pune", 0.0),
            request("MH", "Pune", -5.0),
            request("MH", "Pune", f64::NAN),
            request("MH", "Pune", f64::INFINITY),
        ] {
            assert_eq!(bad.validate().unwrap_err().kind(), ErrorKind::ValidationError);
        }
        assert!(request("MH", "Pune", 62000.0).validate().is_ok());
    }
}
