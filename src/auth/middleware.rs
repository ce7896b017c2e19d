//! Route middleware that runs the auth gate and the role policy before any
//! handler (or body extractor) sees the request.

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, HttpMessage};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use tracing::warn;

use crate::auth::gate::Credentials;
use crate::auth::policy::{self, ANY_ROLE};
use crate::db::Role;
use crate::error::AppError;
use crate::AppState;

/// Wrap a resource with the roles allowed to call it.
///
/// ```ignore
/// web::resource("/admin/dashboard")
///     .wrap(Authorize::roles(policy::ADMIN))
///     .route(web::get().to(dashboard::get_dashboard_stats))
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Authorize {
    allowed: &'static [Role],
}

impl Authorize {
    pub fn roles(allowed: &'static [Role]) -> Self {
        Self { allowed }
    }

    pub fn authenticated() -> Self {
        Self { allowed: ANY_ROLE }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Authorize
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Transform = AuthorizeMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthorizeMiddleware {
            service: Rc::new(service),
            allowed: self.allowed,
        }))
    }
}

pub struct AuthorizeMiddleware<S> {
    service: Rc<S>,
    allowed: &'static [Role],
}

impl<S, B> Service<ServiceRequest> for AuthorizeMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let allowed = self.allowed;

        Box::pin(async move {
            let state = req
                .app_data::<web::Data<AppState>>()
                .cloned()
                .ok_or_else(|| AppError::InternalError("application state not registered".into()))?;
            let credentials = Credentials::from_request(req.request(), &state.config.auth.session_cookie);

            let context = state.gate.authenticate(&credentials).await?;
            if let Err(e) = policy::authorize(&context, allowed) {
                warn!(
                    "Denied {} {} for user {} ({})",
                    req.method(),
                    req.path(),
                    context.user_id,
                    context.role
                );
                return Err(e.into());
            }

            req.extensions_mut().insert(context);
            service.call(req).await
        })
    }
}
