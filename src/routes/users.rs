use actix_web::{cookie::Cookie, http::header, web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::auth::{hash_password, verify_password, AuthUser};
use crate::core::traits::{ProfileReader, StoreError};
use crate::error::ApiError;
use crate::models::{
    LoginRequest, LoginResponse, NewUser, PhotoResponse, RegisterRequest, RegisterResponse,
    SwipeInput, SwipeRequest, SwipeResponse,
};
use crate::routes::AppState;
use crate::services::ObjectStore;

/// Configure all user-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .route("/login", web::post().to(login))
            .route("/register", web::post().to(register))
            .route("/logout", web::delete().to(logout))
            .route("/me", web::get().to(me))
            .route("/find-random", web::get().to(find_random))
            .route("/swipe", web::post().to(swipe))
            .route("/photo", web::put().to(upload_photo)),
    );
}

/// Login endpoint
///
/// POST /v1/user/login
async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let user = match state.store.find_user_by_email(&req.email).await {
        Ok(user) => user,
        Err(StoreError::NotFound(_)) => {
            return Err(ApiError::Unauthorized("wrong email".to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    if !verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::Unauthorized("wrong password".to_string()));
    }

    let token = state.tokens.issue(&user.id, &user.email)?;

    tracing::info!("user {} logged in", user.id);

    let cookie = Cookie::build("token", token.access_token.clone())
        .http_only(true)
        .secure(true)
        .path("/")
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json(LoginResponse {
        email: user.email,
        packages: user.packages,
        token,
    }))
}

/// Registration endpoint
///
/// POST /v1/user/register
async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    match state.store.find_user_by_email(&req.email).await {
        Ok(_) => return Err(ApiError::Validation("email already exists".to_string())),
        Err(StoreError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let password_hash = hash_password(&req.password)?;

    let id = state
        .store
        .create_user(&NewUser {
            full_name: req.full_name.clone(),
            email: req.email.clone(),
            password_hash,
        })
        .await?;

    tracing::info!("registered user {}", id);

    Ok(HttpResponse::Ok().json(RegisterResponse {
        id,
        email: req.email.clone(),
    }))
}

/// Logout endpoint — tokens are stateless, so this only clears the cookie.
///
/// DELETE /v1/user/logout
async fn logout(_auth: AuthUser) -> HttpResponse {
    let mut cookie = Cookie::build("token", "")
        .http_only(true)
        .secure(true)
        .path("/")
        .finish();
    cookie.make_removal();

    HttpResponse::Ok()
        .cookie(cookie)
        .json(serde_json::json!({ "message": "logged out" }))
}

/// Current user's profile with owned packages
///
/// GET /v1/user/me
async fn me(state: web::Data<AppState>, auth: AuthUser) -> Result<HttpResponse, ApiError> {
    let profile = state.store.get_profile(&auth.id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// Next-candidate endpoint: one random profile the caller has not yet been
/// shown today.
///
/// GET /v1/user/find-random
async fn find_random(
    state: web::Data<AppState>,
    auth: AuthUser,
) -> Result<HttpResponse, ApiError> {
    let profile = state.engine.next_candidate(&auth.id).await?;

    tracing::info!("served candidate {} to user {}", profile.id, auth.id);

    Ok(HttpResponse::Ok().json(profile))
}

/// Swipe endpoint
///
/// POST /v1/user/swipe
///
/// Request body:
/// ```json
/// {
///   "id_swipe": "string",
///   "swipe": "like|pass"
/// }
/// ```
async fn swipe(
    state: web::Data<AppState>,
    auth: AuthUser,
    req: web::Json<SwipeRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let input = SwipeInput {
        target_id: req.target_id.clone(),
        direction: req.direction,
    };

    state.engine.record_swipe(&auth.id, &input).await?;

    Ok(HttpResponse::Ok().json(SwipeResponse { success: true }))
}

/// Profile photo upload. Raw image body, JPEG or WebP.
///
/// PUT /v1/user/photo
async fn upload_photo(
    state: web::Data<AppState>,
    auth: AuthUser,
    body: web::Bytes,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let content_type = http_req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let photo_url = state
        .storage
        .put_photo(body.to_vec(), &content_type)
        .await?;

    state.store.set_photo_url(&auth.id, &photo_url).await?;

    tracing::info!("updated photo for user {}", auth.id);

    Ok(HttpResponse::Ok().json(PhotoResponse { photo_url }))
}
