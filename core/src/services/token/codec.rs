//! JWT codec for access and refresh tokens

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::entities::token::{Claims, TokenClass};
use crate::errors::TokenError;

use super::config::TokenCodecConfig;

/// A freshly signed token together with the claims it carries
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWT; the only time the plaintext exists server-side
    pub token: String,
    /// Claims signed into `token`
    pub claims: Claims,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Signs and verifies access and refresh tokens
///
/// Each class has its own secret and lifetime, so a token of one class never
/// verifies as the other. Expiry is checked against the injected [`Clock`]
/// rather than the system time.
pub struct TokenCodec {
    config: TokenCodecConfig,
    access_keys: SigningKeys,
    refresh_keys: SigningKeys,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Creates a new codec
    ///
    /// # Arguments
    ///
    /// * `config` - Secrets, lifetimes and expected issuer/audience
    /// * `clock` - Time source used for `iat`, `exp` and expiry checks
    pub fn new(config: TokenCodecConfig, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        // exp is compared against the injected clock in `verify`
        validation.validate_exp = false;
        validation.validate_nbf = false;

        Self {
            access_keys: SigningKeys::from_secret(&config.access_secret),
            refresh_keys: SigningKeys::from_secret(&config.refresh_secret),
            config,
            validation,
            clock,
        }
    }

    /// Access token lifetime in seconds
    pub fn access_token_ttl(&self) -> i64 {
        self.config.access_token_expiry
    }

    /// Refresh token lifetime in seconds
    pub fn refresh_token_ttl(&self) -> i64 {
        self.config.refresh_token_expiry
    }

    /// Issues an access token for `subject_id`
    pub fn issue_access_token(&self, subject_id: Uuid) -> Result<IssuedToken, TokenError> {
        self.issue(TokenClass::Access, subject_id)
    }

    /// Issues a refresh token for `subject_id`
    ///
    /// The caller is responsible for persisting the digest of the returned
    /// token; the codec never touches the store.
    pub fn issue_refresh_token(&self, subject_id: Uuid) -> Result<IssuedToken, TokenError> {
        self.issue(TokenClass::Refresh, subject_id)
    }

    /// Verifies a token of the expected class and returns its claims
    ///
    /// # Returns
    ///
    /// * `Ok(Claims)` - Signature, issuer, audience, class and expiry all check out
    /// * `Err(TokenError::TokenExpired)` - Authentic but past `exp`
    /// * `Err(TokenError::InvalidSignature)` - Signed with another key, including
    ///   the other class's secret
    /// * `Err(TokenError::InvalidClaims)` - Wrong issuer, audience, class or ids
    /// * `Err(TokenError::InvalidTokenFormat)` - Not a decodable JWT
    pub fn verify(&self, token: &str, class: TokenClass) -> Result<Claims, TokenError> {
        let keys = self.keys(class);
        let claims = decode::<Claims>(token, &keys.decoding, &self.validation)
            .map_err(|e| map_jwt_error(e.kind()))?
            .claims;

        if claims.typ != class {
            return Err(TokenError::InvalidClaims);
        }
        if claims.user_id().is_err() || claims.token_id().is_err() {
            return Err(TokenError::InvalidClaims);
        }
        if claims.is_expired_at(self.clock.now()) {
            return Err(TokenError::TokenExpired);
        }

        Ok(claims)
    }

    /// Verifies an access token
    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify(token, TokenClass::Access)
    }

    fn issue(&self, class: TokenClass, subject_id: Uuid) -> Result<IssuedToken, TokenError> {
        let ttl = match class {
            TokenClass::Access => self.config.access_token_expiry,
            TokenClass::Refresh => self.config.refresh_token_expiry,
        };
        let claims = Claims::new(
            class,
            subject_id,
            self.clock.now(),
            ttl,
            &self.config.issuer,
            &self.config.audience,
        )
        .ok_or(TokenError::TokenGenerationFailed)?;
        let header = Header::new(self.config.algorithm);
        let token = encode(&header, &claims, &self.keys(class).encoding)
            .map_err(|_| TokenError::TokenGenerationFailed)?;

        Ok(IssuedToken { token, claims })
    }

    fn keys(&self, class: TokenClass) -> &SigningKeys {
        match class {
            TokenClass::Access => &self.access_keys,
            TokenClass::Refresh => &self.refresh_keys,
        }
    }
}

fn map_jwt_error(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::ExpiredSignature => TokenError::TokenExpired,
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidSubject
        | ErrorKind::MissingRequiredClaim(_) => TokenError::InvalidClaims,
        _ => TokenError::InvalidTokenFormat,
    }
}
