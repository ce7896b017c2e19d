pub mod admin;
pub mod arguments;
pub mod auth;
pub mod config;
pub mod db;
pub mod documents;
pub mod ecourt;
pub mod error;
pub mod notifications;
pub mod predictor;
pub mod responder;

use actix_web::{guard, web, HttpResponse};
use std::sync::Arc;
use tracing::info;

pub use config::Settings;
pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;

use auth::policy::{ADMIN, LAWYER, LAWYER_OR_ADMIN};
use auth::{codec_from_config, AuthGate, AuthService, Authorize};
use db::Store;
use notifications::Notifier;
use responder::{CannedResponder, Responder};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all workers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub store: Arc<dyn Store>,
    pub gate: Arc<AuthGate>,
    pub auth: Arc<AuthService>,
    pub responder: Arc<dyn Responder>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub async fn new(config: Settings) -> Result<Self> {
        let store = db::connect(&config.database).await?;
        let notifier = notifications::notifier_from_config(&config.notifications)?;
        info!(
            "Using {:?} store and {:?} notifications",
            config.database.backend, config.notifications.provider
        );

        Ok(Self::from_parts(config, store, Arc::new(CannedResponder), notifier))
    }

    /// Assemble state around explicit collaborators.
    pub fn from_parts(
        config: Settings,
        store: Arc<dyn Store>,
        responder: Arc<dyn Responder>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let codec = codec_from_config(&config.auth);
        let gate = Arc::new(AuthGate::new(store.clone(), codec.clone()));
        let auth = Arc::new(AuthService::new(
            store.clone(),
            codec,
            config.auth.bcrypt_cost,
        ));

        Self {
            config: Arc::new(config),
            store,
            gate,
            auth,
            responder,
            notifier,
        }
    }

    pub async fn shutdown(&self) {
        self.store.close().await;
    }
}

/// Malformed bodies, queries and paths surface as validation errors.
fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    );
}

fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(auth::handlers::register))
            .route("/login", web::post().to(auth::handlers::login))
            .route("/logout", web::post().to(auth::handlers::logout))
            .service(
                web::resource("/me")
                    .wrap(Authorize::authenticated())
                    .route(web::get().to(auth::handlers::me)),
            ),
    );
}

fn admin_routes(cfg: &mut web::ServiceConfig) {
    use admin::{circle_rates, dashboard, subscriptions};

    cfg.service(
        web::scope("/admin")
            .service(
                web::resource("/circle-rates")
                    .guard(guard::Post())
                    .wrap(Authorize::roles(ADMIN))
                    .route(web::post().to(circle_rates::create_circle_rate)),
            )
            .service(
                web::resource("/circle-rates")
                    .guard(guard::Get())
                    .wrap(Authorize::authenticated())
                    .route(web::get().to(circle_rates::list_circle_rates)),
            )
            .service(
                web::resource("/dashboard")
                    .wrap(Authorize::roles(ADMIN))
                    .route(web::get().to(dashboard::get_dashboard_stats)),
            )
            .service(
                web::resource("/subscriptions")
                    .wrap(Authorize::roles(ADMIN))
                    .route(web::post().to(subscriptions::update_subscription)),
            )
            .service(
                web::resource("/subscriptions/plans")
                    .wrap(Authorize::roles(ADMIN))
                    .route(web::get().to(subscriptions::list_plans)),
            ),
    );
}

fn document_routes(cfg: &mut web::ServiceConfig) {
    use documents::{malkiyat, ocr, templates};

    cfg.service(
        web::scope("/documents")
            .service(
                web::resource("/templates")
                    .guard(guard::Post())
                    .wrap(Authorize::roles(ADMIN))
                    .route(web::post().to(templates::create_template)),
            )
            .service(
                web::resource("/templates")
                    .guard(guard::Get())
                    .wrap(Authorize::authenticated())
                    .route(web::get().to(templates::list_templates)),
            )
            .service(
                web::resource("/templates/{id}")
                    .guard(guard::Get())
                    .wrap(Authorize::authenticated())
                    .route(web::get().to(templates::get_template)),
            )
            .service(
                web::resource("/templates/{id}")
                    .guard(guard::Any(guard::Put()).or(guard::Delete()))
                    .wrap(Authorize::roles(ADMIN))
                    .route(web::put().to(templates::update_template))
                    .route(web::delete().to(templates::delete_template)),
            )
            .service(
                web::resource("/malkiyat")
                    .wrap(Authorize::roles(LAWYER_OR_ADMIN))
                    .route(web::post().to(malkiyat::calculate_malkiyat)),
            )
            .service(
                web::resource("/ocr")
                    .wrap(Authorize::roles(LAWYER_OR_ADMIN))
                    .route(web::post().to(ocr::extract_text)),
            ),
    );
}

fn lawyer_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/arguments/analyze-judge")
            .wrap(Authorize::roles(LAWYER))
            .route(web::post().to(arguments::analyze_judge)),
    )
    .service(
        web::resource("/arguments/simulate")
            .wrap(Authorize::roles(LAWYER))
            .route(web::post().to(arguments::simulate_argument)),
    )
    .service(
        web::resource("/predictor/win-chance")
            .wrap(Authorize::roles(LAWYER))
            .route(web::post().to(predictor::predict_win_chance)),
    )
    .service(
        web::resource("/ecourt/cases")
            .wrap(Authorize::roles(LAWYER))
            .route(web::get().to(ecourt::list_cases)),
    )
    .service(
        web::resource("/ecourt/drafts")
            .wrap(Authorize::roles(LAWYER))
            .route(web::post().to(ecourt::create_draft)),
    )
    .service(
        web::resource("/notifications/send")
            .wrap(Authorize::roles(LAWYER_OR_ADMIN))
            .route(web::post().to(notifications::send_notification)),
    );
}

/// Every route with its role policy. Expects `web::Data<AppState>` on the app.
pub fn routes(cfg: &mut web::ServiceConfig) {
    extractor_config(cfg);
    cfg.route("/health", web::get().to(health_check));
    auth_routes(cfg);
    admin_routes(cfg);
    document_routes(cfg);
    lawyer_routes(cfg);
}
