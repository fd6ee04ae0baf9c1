use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::JwtIssuer;
use crate::error::ApiError;

/// Authenticated caller, extracted from a Bearer token (or the login
/// cookie as a fallback) on protected routes.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(Into::into))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, ApiError> {
    let issuer = req
        .app_data::<web::Data<JwtIssuer>>()
        .ok_or_else(|| ApiError::Internal("token issuer not configured".to_string()))?;

    let token = bearer_token(req)
        .or_else(|| req.cookie("token").map(|c| c.value().to_string()))
        .ok_or_else(|| ApiError::Unauthorized("invalid token".to_string()))?;

    let claims = issuer
        .verify(&token)
        .map_err(|_| ApiError::Unauthorized("invalid token".to_string()))?;

    Ok(AuthUser {
        id: claims.sub,
        email: claims.email,
    })
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let header = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    header
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}
