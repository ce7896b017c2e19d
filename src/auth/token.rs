//! Session token encoding.
//!
//! Tokens are stateless and carry `{userID, email, role}`. The gate only trusts
//! the user id; everything else is reloaded from the store.
//!
//! The default [`PlainTokenCodec`] is a base64 wrapper around JSON and is NOT a
//! credential: anyone who knows a user id can mint a token for it. Deployments
//! that need tamper resistance set `auth.token_format = "jwt"`.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::config::{AuthConfig, TokenFormat};
use crate::db::Role;
use crate::error::{AppError, AuthError};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPayload {
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

pub trait TokenCodec: Send + Sync {
    fn encode(&self, payload: &SessionPayload) -> Result<String>;

    /// Malformed, expired or forged input fails with `AuthError::InvalidToken`.
    fn decode(&self, token: &str) -> Result<SessionPayload>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTokenCodec;

impl TokenCodec for PlainTokenCodec {
    fn encode(&self, payload: &SessionPayload) -> Result<String> {
        let json = serde_json::to_vec(payload)
            .map_err(|e| AppError::InternalError(format!("token encoding failed: {}", e)))?;
        Ok(BASE64.encode(json))
    }

    fn decode(&self, token: &str) -> Result<SessionPayload> {
        let bytes = BASE64
            .decode(token.trim())
            .map_err(|_| AuthError::InvalidToken)?;
        let payload = serde_json::from_slice(&bytes).map_err(|_| AuthError::InvalidToken)?;
        Ok(payload)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // User ID
    pub email: String,
    pub role: Role,
    pub exp: i64,     // Expiration time
    pub iat: i64,     // Issued at
}

pub struct JwtTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: i64,
}

impl JwtTokenCodec {
    pub fn new(secret: &str, expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours,
        }
    }
}

impl TokenCodec for JwtTokenCodec {
    fn encode(&self, payload: &SessionPayload) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: payload.user_id.to_string(),
            email: payload.email.clone(),
            role: payload.role,
            exp: (now + Duration::hours(self.expiry_hours)).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalError(format!("token signing failed: {}", e)))
    }

    fn decode(&self, token: &str) -> Result<SessionPayload> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))?;
        let user_id = Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::InvalidToken)?;

        Ok(SessionPayload {
            user_id,
            email: data.claims.email,
            role: data.claims.role,
        })
    }
}

pub fn codec_from_config(config: &AuthConfig) -> Arc<dyn TokenCodec> {
    match config.token_format {
        TokenFormat::Plain => {
            warn!("Using unsigned session tokens; set auth.token_format = \"jwt\" for signed tokens");
            Arc::new(PlainTokenCodec)
        }
        TokenFormat::Jwt => Arc::new(JwtTokenCodec::new(
            &config.jwt_secret,
            config.token_expiry_hours,
        )),
    }
}
