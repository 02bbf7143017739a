use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Claims;
use crate::error::AppError;

/// Hands the authenticated caller's user id to a handler.
///
/// Routes using this extractor must sit behind `AuthMiddleware`, which
/// verifies the bearer credential and inserts the claims into the request
/// extensions. Missing claims mean the middleware did not run for this route,
/// and the request is rejected as unauthenticated.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub i32);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>() {
            Some(claims) => ready(Ok(AuthenticatedUser(claims.sub))),
            None => {
                let err = AppError::Unauthenticated("Missing authentication".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
