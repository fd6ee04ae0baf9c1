// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    has_premium, CandidateProfile, NewUser, Package, SwipeDirection, SwipeInput, User,
    PREMIUM_PACKAGE_NAME,
};
pub use requests::{LoginRequest, PackageQuery, PurchaseRequest, RegisterRequest, SwipeRequest};
pub use responses::{
    ErrorResponse, HealthResponse, LoginResponse, PhotoResponse, PurchaseResponse,
    RegisterResponse, SwipeResponse, TokenPair,
};
