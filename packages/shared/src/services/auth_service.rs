use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::config::Config;
use crate::models::auth::TokenClaims;
use crate::services::errors::auth_service_errors::AuthServiceError;

const BEARER_PREFIX: &str = "Bearer ";

/// Resolves the caller's user id from an HS256 bearer token.
#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
}

impl AuthService {
    pub fn new(jwt_secret: &str) -> Self {
        AuthService {
            jwt_secret: jwt_secret.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret)
    }

    /// Issues a 24h token for `user_id`. The HTTP API never calls this;
    /// tokens come from the external identity provider sharing the secret.
    pub fn generate_token(&self, user_id: &str) -> Result<String, AuthServiceError> {
        if user_id.is_empty() {
            return Err(AuthServiceError::ValidationError(
                "User ID cannot be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let claims = TokenClaims {
            sub: user_id.to_string(),
            exp: (now + Duration::hours(24)).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )
        .map_err(|e| AuthServiceError::JwtError(format!("{:#?}", e)))
    }

    pub fn verify_token(&self, token: &str) -> Result<TokenClaims, AuthServiceError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_ref());
        let validation = Validation::default();

        match decode::<TokenClaims>(token, &decoding_key, &validation) {
            Ok(token_data) => Ok(token_data.claims),
            Err(err) => match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    Err(AuthServiceError::ExpiredToken)
                }
                _ => Err(AuthServiceError::InvalidToken),
            },
        }
    }

    pub fn extract_user_id_from_token(&self, token: &str) -> Result<String, AuthServiceError> {
        let claims = self.verify_token(token)?;
        Ok(claims.sub)
    }

    /// Parses an `Authorization` header value of the form `Bearer <token>`.
    pub fn extract_user_id_from_header(
        &self,
        header: Option<&str>,
    ) -> Result<String, AuthServiceError> {
        let header = header.ok_or(AuthServiceError::MissingCredentials)?;
        let token = header
            .strip_prefix(BEARER_PREFIX)
            .ok_or(AuthServiceError::MissingCredentials)?;

        self.extract_user_id_from_token(token)
    }
}
