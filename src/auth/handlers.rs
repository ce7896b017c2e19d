use actix_web::cookie::{Cookie, SameSite};
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::gate::AuthContext;
use crate::auth::service::{PublicProfile, Registration};
use crate::AppState;
use crate::Result;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: PublicProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub user_id: Uuid,
    pub message: String,
}

fn session_cookie(state: &AppState, value: String) -> Cookie<'static> {
    Cookie::build(state.config.auth.session_cookie.clone(), value)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.is_production())
        .finish()
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    info!("Received login request for email: {}", req.email);
    match state.auth.login(&req.email, &req.password).await {
        Ok(outcome) => {
            info!("Login successful for user: {}", outcome.user.id);
            let cookie = session_cookie(&state, outcome.token.clone());
            Ok(HttpResponse::Ok().cookie(cookie).json(LoginResponse {
                success: true,
                token: outcome.token,
                user: outcome.user,
            }))
        }
        Err(e) => {
            error!("Login failed for email: {}: {}", req.email, e);
            Err(e)
        }
    }
}

pub async fn register(
    req: web::Json<Registration>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    info!("Received registration request for email: {} as {}", req.email, req.role);
    let registration = req.into_inner();
    let email = registration.email.clone();

    match state.auth.register(registration).await {
        Ok(user) => {
            info!("Registration successful for email: {}", user.email);
            Ok(HttpResponse::Created().json(RegisterResponse {
                success: true,
                user_id: user.id,
                message: "User registered successfully".to_string(),
            }))
        }
        Err(e) => {
            error!("Registration failed for email: {}: {}", email, e);
            Err(e)
        }
    }
}

/// Tokens are stateless; logging out only clears the session cookie.
pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    let mut cookie = session_cookie(&state, String::new());
    cookie.make_removal();

    HttpResponse::Ok().cookie(cookie).json(serde_json::json!({
        "success": true,
        "message": "Successfully logged out"
    }))
}

pub async fn me(auth: AuthContext) -> HttpResponse {
    HttpResponse::Ok().json(auth)
}
