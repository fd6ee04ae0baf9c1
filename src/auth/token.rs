use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;
use crate::models::TokenPair;

/// JWT claims carried by access and refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 token pairs.
#[derive(Clone)]
pub struct JwtIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl JwtIssuer {
    pub fn new(secret: &str, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    /// Issue an access/refresh pair for an authenticated user.
    pub fn issue(&self, user_id: &str, email: &str) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let access_exp = now + Duration::seconds(self.access_ttl_secs);
        let refresh_exp = now + Duration::seconds(self.refresh_ttl_secs);

        let access_token = self.sign(user_id, email, now.timestamp(), access_exp.timestamp())?;
        let refresh_token = self.sign(user_id, email, now.timestamp(), refresh_exp.timestamp())?;

        Ok(TokenPair {
            access_token,
            access_token_expires_at: access_exp.timestamp(),
            refresh_token,
            refresh_token_expires_at: refresh_exp.timestamp(),
        })
    }

    /// Decode and validate a token, including its expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| AuthError::InvalidToken)?;
        Ok(data.claims)
    }

    fn sign(&self, user_id: &str, email: &str, iat: i64, exp: i64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat,
            exp,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let issuer = JwtIssuer::new("test-secret", 900, 604800);
        let pair = issuer.issue("user-1", "test@mail.com").unwrap();

        let claims = issuer.verify(&pair.access_token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "test@mail.com");
        assert!(pair.refresh_token_expires_at > pair.access_token_expires_at);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtIssuer::new("test-secret", 900, 604800);
        let other = JwtIssuer::new("other-secret", 900, 604800);
        let pair = issuer.issue("user-1", "test@mail.com").unwrap();

        assert!(matches!(
            other.verify(&pair.access_token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = JwtIssuer::new("test-secret", -120, 604800);
        let pair = issuer.issue("user-1", "test@mail.com").unwrap();

        assert!(issuer.verify(&pair.access_token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let issuer = JwtIssuer::new("test-secret", 900, 604800);
        assert!(issuer.verify("not.a.jwt").is_err());
    }
}
