use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, Ready};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::auth::token::TokenCodec;
use crate::db::{Role, Store, User};
use crate::error::{AppError, AuthError};
use crate::Result;

/// Raw credential material pulled off a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credentials {
    pub bearer: Option<String>,
    pub cookie: Option<String>,
}

impl Credentials {
    pub fn from_request(req: &HttpRequest, cookie_name: &str) -> Self {
        let bearer = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string());
        let cookie = req.cookie(cookie_name).map(|c| c.value().to_string());

        Self { bearer, cookie }
    }

    /// Header wins over cookie; blank values count as absent.
    pub fn token(&self) -> Option<&str> {
        self.bearer
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.cookie.as_deref().filter(|t| !t.is_empty()))
    }
}

/// Identity of the caller, sourced from the persisted user record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crn_number: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for AuthContext {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            crn_number: user.crn_number.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// Handlers behind [`crate::auth::Authorize`] take `AuthContext` as an argument.
impl FromRequest for AuthContext {
    type Error = AppError;
    type Future = Ready<std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthContext>()
                .cloned()
                .ok_or(AppError::AuthError(AuthError::MissingToken)),
        )
    }
}

pub struct AuthGate {
    store: Arc<dyn Store>,
    codec: Arc<dyn TokenCodec>,
}

impl AuthGate {
    pub fn new(store: Arc<dyn Store>, codec: Arc<dyn TokenCodec>) -> Self {
        Self { store, codec }
    }

    /// Resolve credentials to an active user. Read-only.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<AuthContext> {
        let token = credentials.token().ok_or(AuthError::MissingToken)?;
        let payload = self.codec.decode(token)?;

        let user = self
            .store
            .get_user_by_id(payload.user_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or(AuthError::InactiveUser)?;

        if user.role != payload.role {
            debug!(
                "Token role '{}' for user {} is stale, using stored role '{}'",
                payload.role, user.id, user.role
            );
        }

        Ok(AuthContext::from(&user))
    }
}
