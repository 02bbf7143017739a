use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::PgPool;
use std::rc::Rc;

use crate::auth::token::TokenKeys;
use crate::error::AppError;

/// The gate in front of every `/api` route except registration and login.
///
/// For each request it extracts the bearer credential from the authorization
/// header, verifies signature and expiry, and resolves the token's subject
/// against the users table. A subject that no longer exists is rejected the
/// same way as a bad token. On success the verified claims are attached to the
/// request extensions for the handlers' extractor.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Registration and login are the only unauthenticated API endpoints.
        let path = req.path();
        if path == "/api/user/register" || path == "/api/user/login" {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let token = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::to_owned)
                .ok_or_else(|| AppError::Unauthenticated("Missing token".into()))?;

            let keys = req
                .app_data::<web::Data<TokenKeys>>()
                .cloned()
                .ok_or_else(|| AppError::Internal("Token keys not configured".into()))?;
            let claims = keys.verify(&token)?;

            // Resolve the subject; a token for a deleted account is as good as
            // no token.
            let pool = req
                .app_data::<web::Data<PgPool>>()
                .cloned()
                .ok_or_else(|| AppError::Internal("Database pool not configured".into()))?;
            let subject = sqlx::query_scalar::<_, i32>("SELECT id FROM users WHERE id = $1")
                .bind(claims.sub)
                .fetch_optional(&**pool)
                .await
                .map_err(AppError::from)?;
            if subject.is_none() {
                return Err(AppError::Unauthenticated("User no longer exists".into()).into());
            }

            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}
