use serde::{Deserialize, Serialize};

/// Name of the package that exempts its owner from the daily swipe quota.
pub const PREMIUM_PACKAGE_NAME: &str = "premium";

/// A registered user document, with the owned package reference data joined in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(rename = "fullname")]
    pub full_name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub photo_url: Option<String>,
    /// Owned package ids; the set the purchase flow appends to.
    #[serde(skip)]
    pub package_ids: Vec<String>,
    pub packages: Vec<Package>,
}

impl User {
    pub fn is_premium(&self) -> bool {
        has_premium(&self.packages)
    }
}

/// True iff any owned package is the premium one.
pub fn has_premium(packages: &[Package]) -> bool {
    packages.iter().any(|p| p.name == PREMIUM_PACKAGE_NAME)
}

/// Fields required to create a user document.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Purchasable package. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: String,
    #[serde(rename = "package_name")]
    pub name: String,
    pub description: String,
}

/// Another user's profile as shown to a swiping user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: String,
    #[serde(rename = "fullname")]
    pub full_name: String,
    pub email: String,
    pub photo_url: Option<String>,
    #[serde(default)]
    pub packages: Vec<Package>,
}

/// Swipe verdict on a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Like,
    Pass,
}

/// Validated swipe payload consumed by the matching engine.
#[derive(Debug, Clone)]
pub struct SwipeInput {
    pub target_id: String,
    pub direction: SwipeDirection,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(name: &str) -> Package {
        Package {
            id: "p1".to_string(),
            name: name.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_premium_derived_from_package_name() {
        assert!(!has_premium(&[]));
        assert!(!has_premium(&[package("boost")]));
        assert!(has_premium(&[package("boost"), package("premium")]));

        let user = User {
            id: "u1".to_string(),
            full_name: "Test".to_string(),
            email: "test@mail.com".to_string(),
            password_hash: String::new(),
            photo_url: None,
            package_ids: vec!["p1".to_string()],
            packages: vec![package("premium")],
        };
        assert!(user.is_premium());
    }

    #[test]
    fn test_swipe_direction_wire_format() {
        assert_eq!(
            serde_json::to_string(&SwipeDirection::Like).unwrap(),
            "\"like\""
        );
        let parsed: SwipeDirection = serde_json::from_str("\"pass\"").unwrap();
        assert_eq!(parsed, SwipeDirection::Pass);
        assert!(serde_json::from_str::<SwipeDirection>("\"superlike\"").is_err());
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User {
            id: "u1".to_string(),
            full_name: "Test".to_string(),
            email: "test@mail.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            photo_url: None,
            package_ids: vec![],
            packages: vec![],
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
    }
}
