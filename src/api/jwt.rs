//! JWT issuance and validation
//!
//! Access tokens are short-lived, refresh tokens long-lived; both carry the
//! user id as subject and a `token_type` discriminator so one kind can never
//! stand in for the other.

use std::sync::OnceLock;

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::warn;

static JWT_SERVICE: OnceLock<JwtService> = OnceLock::new();

/// Get the cached JwtService instance, built from config on first use.
pub fn get_jwt_service() -> &'static JwtService {
    JWT_SERVICE.get_or_init(JwtService::from_config)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub token_type: String,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_minutes: u64,
    refresh_token_days: u64,
}

impl JwtService {
    pub fn new(secret: &str, access_token_minutes: u64, refresh_token_days: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_minutes,
            refresh_token_days,
        }
    }

    pub fn from_config() -> Self {
        let config = crate::config::get_config();

        let jwt_secret = if config.api.jwt_secret.is_empty() {
            warn!("JWT secret not configured, generating a random one for this process");
            crate::utils::generate_secure_token(32)
        } else {
            config.api.jwt_secret.clone()
        };

        Self::new(
            &jwt_secret,
            config.api.access_token_minutes,
            config.api.refresh_token_days,
        )
    }

    pub fn generate_access_token(
        &self,
        user_id: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        self.generate(
            user_id,
            "access",
            Duration::minutes(self.access_token_minutes as i64),
        )
    }

    pub fn generate_refresh_token(
        &self,
        user_id: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        self.generate(
            user_id,
            "refresh",
            Duration::days(self.refresh_token_days as i64),
        )
    }

    fn generate(
        &self,
        user_id: &str,
        token_type: &str,
        lifetime: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: token_type.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
    }

    pub fn validate_access_token(
        &self,
        token: &str,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        self.validate(token, "access")
    }

    pub fn validate_refresh_token(
        &self,
        token: &str,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        self.validate(token, "refresh")
    }

    fn validate(
        &self,
        token: &str,
        expected_type: &str,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())?;

        if token_data.claims.token_type != expected_type {
            return Err(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidToken,
            ));
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test-secret", 15, 7)
    }

    #[test]
    fn test_access_token_roundtrip() {
        let jwt = service();
        let token = jwt.generate_access_token("user-42").unwrap();
        let claims = jwt.validate_access_token(&token).unwrap();
        assert_eq!(claims.sub, "user-42");
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let jwt = service();
        let refresh = jwt.generate_refresh_token("user-42").unwrap();
        assert!(jwt.validate_access_token(&refresh).is_err());
        assert!(jwt.validate_refresh_token(&refresh).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().generate_access_token("user-42").unwrap();
        let other = JwtService::new("different-secret", 15, 7);
        assert!(other.validate_access_token(&token).is_err());
    }
}
