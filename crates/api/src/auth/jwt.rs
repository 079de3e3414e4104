//! JWT bearer-token generation and validation.
//!
//! Tokens are HS256-signed JWTs containing a [`Claims`] payload. Every issued
//! token is backed by a `user_sessions` row keyed by its `jti`, so logout can
//! revoke a token before it expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use websurvey_core::types::DbId;

/// JWT claims embedded in every token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Token identifier; the key of the backing session row.
    pub jti: Uuid,
}

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Lifetime of a regular login token in minutes (default: one day).
    pub access_token_expiry_mins: i64,
    /// Lifetime of a "remember me" token in days (default: 30).
    pub remember_expiry_days: i64,
}

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60 * 24;
const DEFAULT_REMEMBER_EXPIRY_DAYS: i64 = 30;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                     | Required | Default |
    /// |-----------------------------|----------|---------|
    /// | `JWT_SECRET`                | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`    | no       | `1440`  |
    /// | `JWT_REMEMBER_EXPIRY_DAYS`  | no       | `30`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins: i64 = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64");

        let remember_expiry_days: i64 = std::env::var("JWT_REMEMBER_EXPIRY_DAYS")
            .unwrap_or_else(|_| DEFAULT_REMEMBER_EXPIRY_DAYS.to_string())
            .parse()
            .expect("JWT_REMEMBER_EXPIRY_DAYS must be a valid i64");

        Self {
            secret,
            access_token_expiry_mins,
            remember_expiry_days,
        }
    }

    /// Token lifetime for a login, longer when the user asked to be remembered.
    pub fn lifetime(&self, remember: bool) -> Duration {
        if remember {
            Duration::days(self.remember_expiry_days)
        } else {
            Duration::minutes(self.access_token_expiry_mins)
        }
    }
}

/// A freshly signed token together with what the session row needs.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub token_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Sign a token for `user_id` valid for `lifetime`.
pub fn generate_access_token(
    user_id: DbId,
    lifetime: Duration,
    config: &JwtConfig,
) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expires_at = now + lifetime;
    let token_id = Uuid::new_v4();

    let claims = Claims {
        sub: user_id,
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
        jti: token_id,
    };

    let token = encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;

    Ok(IssuedToken {
        token,
        token_id,
        expires_at,
    })
}

/// Validate and decode a token, returning the embedded [`Claims`].
///
/// Validates the signature and expiration.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
            remember_expiry_days: 30,
        }
    }

    #[test]
    fn generate_and_validate() {
        let config = test_config();
        let issued = generate_access_token(42, config.lifetime(false), &config)
            .expect("token generation should succeed");

        let claims = validate_token(&issued.token, &config).expect("token should validate");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.jti, issued.token_id);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn remember_me_lasts_longer() {
        let config = test_config();
        assert_eq!(config.lifetime(false), Duration::minutes(60));
        assert_eq!(config.lifetime(true), Duration::days(30));
    }

    #[test]
    fn expired_token_fails() {
        let config = test_config();
        // Well beyond the default 60-second leeway.
        let issued = generate_access_token(1, Duration::minutes(-5), &config).unwrap();
        assert!(validate_token(&issued.token, &config).is_err());
    }

    #[test]
    fn different_secret_fails() {
        let config = test_config();
        let other = JwtConfig {
            secret: "another-secret".to_string(),
            ..test_config()
        };
        let issued = generate_access_token(1, config.lifetime(false), &config).unwrap();
        assert!(validate_token(&issued.token, &other).is_err());
    }
}
