use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::env;
use uuid::Uuid;

use crate::{models::user::Role, Result};

/// Seven days.
const DEFAULT_TOKEN_DURATION_MIN: i64 = 7 * 24 * 60;

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub website_url: String,
    pub token_duration_min: i64,
    pub jwt_algorithm: Algorithm,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            jwt_secret: env::var("JWT_SECRET")?,
            website_url: env::var("WEBSITE_URL")?,
            token_duration_min: env::var("TOKEN_DURATION_MIN")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(DEFAULT_TOKEN_DURATION_MIN),
            jwt_algorithm: Algorithm::HS256,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (user_id)
    pub role: Role,
    pub exp: usize, // expiration time
    pub iat: usize, // issued at
    pub nbf: usize, // not before
    pub iss: String,
    pub aud: String,
    pub jti: String,
}

impl Claims {
    pub fn new(sub: String, role: Role, config: &AuthConfig) -> Self {
        let iat = Utc::now();
        let exp = iat + Duration::minutes(config.token_duration_min);

        Self {
            sub,
            role,
            exp: exp.timestamp() as usize,
            iat: iat.timestamp() as usize,
            nbf: iat.timestamp() as usize,
            iss: config.website_url.to_string(),
            aud: config.website_url.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

pub struct TokenService;

impl TokenService {
    pub fn create_token(sub: String, role: Role, config: &AuthConfig) -> Result<String> {
        let claims = Claims::new(sub, role, config);
        encode(
            &Header::new(config.jwt_algorithm),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .map_err(|_| crate::Error::TokenCreationError)
    }

    pub fn validate_token(token: &str, config: &AuthConfig) -> Result<Claims> {
        let mut validation = Validation::new(config.jwt_algorithm);
        validation.set_audience(&[config.website_url.to_string()]);
        validation.set_issuer(&[config.website_url.to_string()]);

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &validation,
        )?;
        Ok(decoded.claims)
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret".to_string(),
        website_url: "http://localhost:5173".to_string(),
        token_duration_min: DEFAULT_TOKEN_DURATION_MIN,
        jwt_algorithm: Algorithm::HS256,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_token_carries_id_and_role() {
        let config = test_config();
        let token = TokenService::create_token("abc".into(), Role::Artist, &config).unwrap();
        let claims = TokenService::validate_token(&token, &config).unwrap();

        assert_eq!(claims.sub, "abc");
        assert_eq!(claims.role, Role::Artist);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let config = test_config();
        let token = TokenService::create_token("abc".into(), Role::Fan, &config).unwrap();

        let other = AuthConfig {
            jwt_secret: "another-secret".to_string(),
            ..test_config()
        };
        let result = TokenService::validate_token(&token, &other);
        assert!(matches!(result, Err(Error::AuthFailInvalidToken)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let config = AuthConfig {
            token_duration_min: -10,
            ..test_config()
        };
        let token = TokenService::create_token("abc".into(), Role::Fan, &config).unwrap();
        let result = TokenService::validate_token(&token, &config);
        assert!(matches!(result, Err(Error::AuthFailInvalidToken)));
    }
}
