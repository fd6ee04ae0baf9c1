// Core engine exports
pub mod engine;
pub mod entitlements;
pub mod exclusion;
pub mod quota;
pub mod traits;

pub use engine::{EngineError, MatchingEngine};
pub use entitlements::{PackageService, PurchaseError};
pub use exclusion::{ttl_until_end_of_day, CacheKey, ExclusionSet, SWIPE_WINDOW};
pub use quota::{swipe_allowed, FREE_DAILY_SWIPES};
pub use traits::{CacheError, ExclusionCache, PackageStore, ProfileReader, StoreError};
