use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::auth::AuthError;
use crate::core::engine::EngineError;
use crate::core::entitlements::PurchaseError;
use crate::core::traits::{CacheError, StoreError};
use crate::models::ErrorResponse;
use crate::services::storage::StorageError;

/// Caller-facing error taxonomy. Every kind maps to a distinct HTTP status
/// and a stable machine-readable tag.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("daily swipe limit reached, purchase the premium package to keep swiping")]
    QuotaExceeded,

    #[error("already swiped")]
    Duplicate,

    #[error("package already purchased")]
    AlreadyOwned,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::NotFound(_) => "not_found",
            ApiError::QuotaExceeded => "quota_exceeded",
            ApiError::Duplicate => "duplicate",
            ApiError::AlreadyOwned => "already_owned",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::QuotaExceeded => StatusCode::FORBIDDEN,
            ApiError::Duplicate | ApiError::AlreadyOwned => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Internal(message) = self {
            tracing::error!("internal error: {}", message);
        }
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
            status_code: self.status_code().as_u16(),
        })
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Validation(message) => ApiError::Validation(message),
            EngineError::NoCandidate => ApiError::NotFound(e.to_string()),
            EngineError::QuotaExceeded => ApiError::QuotaExceeded,
            EngineError::AlreadySwiped => ApiError::Duplicate,
            EngineError::Store(inner) => inner.into(),
            EngineError::Cache(inner) => inner.into(),
        }
    }
}

impl From<PurchaseError> for ApiError {
    fn from(e: PurchaseError) -> Self {
        match e {
            PurchaseError::AlreadyOwned => ApiError::AlreadyOwned,
            PurchaseError::PackageNotFound => ApiError::NotFound(e.to_string()),
            PurchaseError::Store(inner) => inner.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(message) => ApiError::NotFound(message),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<CacheError> for ApiError {
    fn from(e: CacheError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::UnsupportedMediaType => ApiError::Validation(e.to_string()),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidToken => ApiError::Unauthorized(e.to_string()),
            e => ApiError::Internal(e.to_string()),
        }
    }
}
