use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::SwipeDirection;

/// Login credentials
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

/// New account registration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(rename = "fullname")]
    #[validate(length(min = 1))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

/// Swipe on a candidate profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SwipeRequest {
    #[serde(rename = "id_swipe")]
    #[validate(length(min = 1))]
    pub target_id: String,
    #[serde(rename = "swipe")]
    pub direction: SwipeDirection,
}

/// Package purchase (modeled as a no-payment unlock)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PurchaseRequest {
    #[serde(rename = "id")]
    #[validate(length(min = 1))]
    pub package_id: String,
}

/// Query parameters for package lookup by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageQuery {
    pub id: String,
}
