use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::{SessionPayload, TokenCodec};
use crate::db::{Role, Store, User};
use crate::error::{AppError, AuthError, DatabaseError};
use crate::Result;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub crn_number: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crn_number: Option<String>,
}

impl From<&User> for PublicProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            crn_number: user.crn_number.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: PublicProfile,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct AuthService {
    store: Arc<dyn Store>,
    codec: Arc<dyn TokenCodec>,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, codec: Arc<dyn TokenCodec>, bcrypt_cost: u32) -> Self {
        Self {
            store,
            codec,
            bcrypt_cost,
        }
    }

    /// Validate, reject duplicates, persist. Does not log the user in.
    pub async fn register(&self, registration: Registration) -> Result<User> {
        let email = normalize_email(&registration.email);
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::validation("A valid email address is required"));
        }
        if registration.password.is_empty() {
            return Err(AppError::validation("Password is required"));
        }

        let crn_number = match registration.role {
            Role::Lawyer => {
                let crn = registration
                    .crn_number
                    .as_deref()
                    .map(str::trim)
                    .filter(|crn| !crn.is_empty())
                    .ok_or_else(|| AppError::validation("CRN number is required for lawyers"))?;
                Some(crn.to_string())
            }
            // CRN only identifies lawyers
            Role::Admin | Role::User => None,
        };

        if self.store.get_user_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("User with this email already exists".into()));
        }

        let password_hash = hash_password(&registration.password, self.bcrypt_cost)?;
        let user = User::new(
            email,
            password_hash,
            registration.role,
            crn_number,
            registration.first_name.trim().to_string(),
            registration.last_name.trim().to_string(),
        );

        // A concurrent registration can still win the race; the unique constraint decides.
        match self.store.create_user(&user).await {
            Ok(user) => {
                info!("Registered {} user {}", user.role, user.id);
                Ok(user)
            }
            Err(AppError::DatabaseError(DatabaseError::Duplicate)) => {
                Err(AppError::Conflict("User with this email already exists".into()))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let email = normalize_email(email);
        let user = match self.store.get_user_by_email(&email).await? {
            Some(user) if user.is_active => user,
            _ => return Err(AuthError::InvalidCredentials.into()),
        };

        if !verify_password(password, &user.password_hash)? {
            warn!("Password mismatch for user {}", user.id);
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.codec.encode(&SessionPayload {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
        })?;

        Ok(LoginOutcome {
            token,
            user: PublicProfile::from(&user),
        })
    }
}
