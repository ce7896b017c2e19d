#![allow(dead_code)]

use actix_web::web;
use advocate_server::auth::Registration;
use advocate_server::db::{MemoryStore, Role};
use advocate_server::notifications::LogNotifier;
use advocate_server::responder::CannedResponder;
use advocate_server::{AppState, Settings};
use std::sync::Arc;
use uuid::Uuid;

pub const PASSWORD: &str = "correct horse battery staple";

/// App state over a fresh in-memory store. The store handle is returned for direct inspection.
pub fn test_state() -> (web::Data<AppState>, Arc<MemoryStore>) {
    let config = Settings::for_tests().expect("Failed to load test config");
    let store = Arc::new(MemoryStore::new());
    let state = AppState::from_parts(
        config,
        store.clone(),
        Arc::new(CannedResponder),
        Arc::new(LogNotifier),
    );
    (web::Data::new(state), store)
}

pub struct Session {
    pub user_id: Uuid,
    pub token: String,
}

impl Session {
    pub fn bearer(&self) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.token))
    }
}

/// Register through the service layer and log in.
pub async fn sign_up(state: &AppState, email: &str, role: Role) -> Session {
    let crn_number = match role {
        Role::Lawyer => Some(format!("CRN-{}", &Uuid::new_v4().to_string()[..8])),
        _ => None,
    };
    let user = state
        .auth
        .register(Registration {
            email: email.to_string(),
            password: PASSWORD.to_string(),
            role,
            crn_number,
            first_name: "Test".into(),
            last_name: role.to_string(),
        })
        .await
        .expect("registration failed");

    let outcome = state.auth.login(email, PASSWORD).await.expect("login failed");
    Session {
        user_id: user.id,
        token: outcome.token,
    }
}
