//! Session tokens - HS256 JWTs carrying the acting user's id.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use common::{AppError, AppResult, JwtConfig};
use domain::{User, MIN_JWT_SECRET_LENGTH, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i32,
    pub exp: i64,
    pub iat: i64,
    /// Issued by a guest login
    #[serde(default)]
    pub guest: bool,
}

/// Token response returned after successful authentication
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    /// JWT access token
    pub access_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Token expiration time in seconds
    pub expires_in: i64,
}

/// Maps an inbound credential to the acting user's id.
pub trait IdentityResolver: Send + Sync {
    /// Accepts a raw token or an `Authorization` header value.
    fn resolve(&self, credential: &str) -> AppResult<i32>;
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct SessionTokens {
    config: JwtConfig,
}

impl SessionTokens {
    /// # Errors
    /// `Validation` if the secret is shorter than the minimum length.
    pub fn new(config: JwtConfig) -> AppResult<Self> {
        if config.secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::validation(format!(
                "JWT_SECRET must be at least {} characters",
                MIN_JWT_SECRET_LENGTH
            )));
        }
        Ok(Self { config })
    }

    fn secret_bytes(&self) -> &[u8] {
        self.config.secret.as_bytes()
    }

    /// Generate a token for a user
    pub fn issue(&self, user: &User) -> AppResult<TokenResponse> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.config.expiration_hours);

        let claims = Claims {
            sub: user.id,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            guest: user.is_guest(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret_bytes()),
        )?;

        Ok(TokenResponse {
            access_token: token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.config.expiration_hours * SECONDS_PER_HOUR,
        })
    }

    /// Verify signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}

impl IdentityResolver for SessionTokens {
    fn resolve(&self, credential: &str) -> AppResult<i32> {
        let token = credential
            .strip_prefix(TOKEN_TYPE_BEARER)
            .map(str::trim_start)
            .unwrap_or(credential)
            .trim();

        if token.is_empty() {
            return Err(AppError::Unauthorized);
        }

        Ok(self.verify(token)?.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(hours: i64) -> SessionTokens {
        SessionTokens::new(JwtConfig {
            secret: "a-test-secret-that-is-long-enough-for-hs256".to_string(),
            expiration_hours: hours,
        })
        .unwrap()
    }

    fn user(id: i32, group: i32) -> User {
        let now = Utc::now();
        User {
            id,
            name: "alice".to_string(),
            password_hash: String::new(),
            email: "alice@example.com".to_string(),
            user_group_id: group,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = SessionTokens::new(JwtConfig {
            secret: "short".to_string(),
            expiration_hours: 1,
        });
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_token_round_trip() {
        let tokens = tokens(24);
        let issued = tokens.issue(&user(42, 5)).unwrap();

        assert_eq!(issued.token_type, "Bearer");
        assert_eq!(issued.expires_in, 24 * 3600);

        let claims = tokens.verify(&issued.access_token).unwrap();
        assert_eq!(claims.sub, 42);
        assert!(!claims.guest);
    }

    #[test]
    fn test_resolve_accepts_header_value() {
        let tokens = tokens(1);
        let issued = tokens.issue(&user(7, 0)).unwrap();

        assert_eq!(tokens.resolve(&issued.access_token).unwrap(), 7);
        assert_eq!(
            tokens.resolve(&format!("Bearer {}", issued.access_token)).unwrap(),
            7
        );
        assert!(tokens.verify(&issued.access_token).unwrap().guest);
    }

    #[test]
    fn test_resolve_rejects_garbage_and_empty() {
        let tokens = tokens(1);
        assert!(matches!(tokens.resolve(""), Err(AppError::Unauthorized)));
        assert!(matches!(tokens.resolve("Bearer "), Err(AppError::Unauthorized)));
        assert!(matches!(tokens.resolve("not.a.jwt"), Err(AppError::Jwt(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Past the default 60s leeway
        let tokens = tokens(-1);
        let issued = tokens.issue(&user(1, 1)).unwrap();
        assert!(tokens.verify(&issued.access_token).is_err());
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let issued = tokens(1).issue(&user(1, 1)).unwrap();
        let other = SessionTokens::new(JwtConfig {
            secret: "another-secret-that-is-also-long-enough".to_string(),
            expiration_hours: 1,
        })
        .unwrap();
        assert!(other.resolve(&issued.access_token).is_err());
    }
}
