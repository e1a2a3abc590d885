//! JWT token service implementation.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bitacora_core::ports::{AuthError, TokenClaims, TokenService};

/// JWT token service configuration.
///
/// The signing secret is required input: there is deliberately no default
/// and no fallback, so a deployment cannot silently run with a known key.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
    pub issuer: String,
}

impl JwtConfig {
    /// Config with the standard 24 hour token lifetime.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours: 24,
            issuer: "bitacora-api".to_string(),
        }
    }
}

/// Wire-format claims.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user id
    username: String,
    exp: i64, // expiry, epoch seconds
    iat: i64, // issued at
    iss: String,
}

/// HS256-signed bearer tokens carrying identity and expiry.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            encoding_key,
            decoding_key,
            config,
        }
    }
}

impl TokenService for JwtTokenService {
    fn generate_token(&self, user_id: Uuid, username: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + TimeDelta::hours(self.config.expiration_hours);

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);
        // Expiry is enforced to the second; the default 60s leeway would
        // keep expired tokens alive.
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        let user_id = Uuid::parse_str(&token_data.claims.sub)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(TokenClaims {
            user_id,
            username: token_data.claims.username,
            exp: token_data.claims.exp,
        })
    }

    fn expiration_seconds(&self) -> i64 {
        self.config.expiration_hours * 3600
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig::new("test-secret-key")
    }

    #[test]
    fn generated_token_roundtrips() {
        let service = JwtTokenService::new(test_config());
        let user_id = Uuid::new_v4();

        let token = service.generate_token(user_id, "ana_dev").unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.username, "ana_dev");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn expiry_is_issue_time_plus_configured_hours() {
        let service = JwtTokenService::new(test_config());

        let before = Utc::now().timestamp();
        let token = service.generate_token(Uuid::new_v4(), "ana").unwrap();
        let after = Utc::now().timestamp();

        let claims = service.validate_token(&token).unwrap();
        assert!(claims.exp >= before + 24 * 3600);
        assert!(claims.exp <= after + 24 * 3600);
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = JwtConfig {
            expiration_hours: -1,
            ..test_config()
        };
        let service = JwtTokenService::new(config);

        let token = service.generate_token(Uuid::new_v4(), "ana").unwrap();
        let result = service.validate_token(&token);

        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[test]
    fn garbage_token_is_invalid() {
        let service = JwtTokenService::new(test_config());

        let result = service.validate_token("not-a-token");

        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn token_from_another_issuer_is_rejected() {
        let issuer1 = JwtTokenService::new(JwtConfig {
            issuer: "issuer1".into(),
            ..test_config()
        });
        let issuer2 = JwtTokenService::new(JwtConfig {
            issuer: "issuer2".into(),
            ..test_config()
        });

        let token = issuer1.generate_token(Uuid::new_v4(), "ana").unwrap();

        assert!(issuer2.validate_token(&token).is_err());
    }

    #[test]
    fn expiration_seconds_matches_config() {
        let service = JwtTokenService::new(test_config());
        assert_eq!(service.expiration_seconds(), 86400);
    }
}
