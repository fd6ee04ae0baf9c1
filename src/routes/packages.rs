use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::{PackageQuery, PurchaseRequest, PurchaseResponse};
use crate::routes::AppState;

/// Configure all package-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/package")
            .route("/list", web::get().to(list))
            .route("/purchase", web::post().to(purchase))
            .route("", web::get().to(get_by_id)),
    );
}

/// Package catalog
///
/// GET /v1/package/list
async fn list(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let packages = state.packages.list().await?;
    Ok(HttpResponse::Ok().json(packages))
}

/// Single package lookup
///
/// GET /v1/package?id={packageId}
async fn get_by_id(
    state: web::Data<AppState>,
    query: web::Query<PackageQuery>,
) -> Result<HttpResponse, ApiError> {
    let package = state.packages.get(&query.id).await?;
    Ok(HttpResponse::Ok().json(package))
}

/// Purchase endpoint: a no-payment unlock appended to the owned set.
///
/// POST /v1/package/purchase
async fn purchase(
    state: web::Data<AppState>,
    auth: AuthUser,
    req: web::Json<PurchaseRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    state.packages.purchase(&auth.id, &req.package_id).await?;

    Ok(HttpResponse::Ok().json(PurchaseResponse {
        success: true,
        package_id: req.package_id.clone(),
    }))
}
