use crate::domain::auth::{Claims, TokenError, TokenService, TokenType};
use crate::infrastructure::config::JwtConfig;
use argon2::password_hash::rand_core::{OsRng, RngCore};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Deserialize;
use time::Duration;

/// The claims `validate` reads back. `type` stays a string so an unknown
/// value is reported as a type mismatch rather than a malformed token.
#[derive(Deserialize)]
struct VerifiedClaims {
    sub: String,
    #[serde(rename = "type")]
    token_type: String,
}

/// JWT token service using HS256 with a process-owned secret
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_token_lifetime: Duration,
    refresh_token_lifetime: Duration,
}

impl JwtTokenService {
    pub fn new(
        secret: &[u8],
        access_token_lifetime: Duration,
        refresh_token_lifetime: Duration,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_token_lifetime,
            refresh_token_lifetime,
        }
    }

    /// Build the service from configuration. Without a configured secret a
    /// random one is generated, so tokens do not survive a restart.
    pub fn from_config(config: &JwtConfig) -> Self {
        let access = Duration::seconds(config.access_token_expiry);
        let refresh = Duration::seconds(config.refresh_token_expiry);

        match &config.secret {
            Some(secret) => Self::new(secret.as_bytes(), access, refresh),
            None => {
                tracing::warn!(
                    "JWT_SECRET not set; using an ephemeral signing secret, sessions end on restart"
                );
                Self::new(&generate_secret(), access, refresh)
            }
        }
    }

    fn issue(
        &self,
        subject: &str,
        token_type: TokenType,
        lifetime: Duration,
    ) -> Result<String, TokenError> {
        let claims = Claims::new(subject, token_type, lifetime);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

pub fn generate_secret() -> [u8; 32] {
    let mut secret = [0u8; 32];
    OsRng.fill_bytes(&mut secret);
    secret
}

impl TokenService for JwtTokenService {
    fn issue_access_token(&self, subject: &str) -> Result<String, TokenError> {
        self.issue(subject, TokenType::Access, self.access_token_lifetime)
    }

    fn issue_refresh_token(&self, subject: &str) -> Result<String, TokenError> {
        self.issue(subject, TokenType::Refresh, self.refresh_token_lifetime)
    }

    fn validate(&self, token: &str, expected: TokenType) -> Result<String, TokenError> {
        let data = decode::<VerifiedClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;

        if data.claims.token_type != expected.as_str() {
            return Err(TokenError::TypeMismatch {
                expected,
                found: data.claims.token_type,
            });
        }

        if data.claims.sub.is_empty() {
            return Err(TokenError::Malformed);
        }

        Ok(data.claims.sub)
    }

    fn access_token_lifetime(&self) -> Duration {
        self.access_token_lifetime
    }
}
