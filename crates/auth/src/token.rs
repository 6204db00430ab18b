//! Signed, self-contained session tokens (JWT, HS256 only).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use notekeeper_core::UserId;

use crate::claims::{SessionClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature, wrong algorithm, malformed encoding or missing claims.
    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("invalid token: {0}")]
    Claims(#[from] TokenValidationError),

    #[error("invalid token ttl")]
    InvalidTtl,

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Issues and verifies session tokens with one symmetric secret.
///
/// The algorithm is fixed at construction; the token header's `alg` is only
/// compared against it, never used to pick a verification scheme.
#[derive(Clone)]
pub struct TokenIssuer {
    header: Header,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    const ALGORITHM: Algorithm = Algorithm::HS256;

    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Self::ALGORITHM);
        // Expiry is checked by `validate_claims` against the caller's clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            header: Header::new(Self::ALGORITHM),
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Mint a token for `user_id` valid from `now` until `now + ttl`.
    pub fn issue(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        if ttl < Duration::seconds(1) {
            return Err(TokenError::InvalidTtl);
        }

        let expires_at = now.checked_add_signed(ttl).ok_or(TokenError::InvalidTtl)?;
        let claims = SessionClaims::new(user_id, now, expires_at);
        encode(&self.header, &claims, &self.encoding).map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Check signature and time window, returning the token's subject.
    ///
    /// Whether the subject still exists in storage is not checked here.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenError> {
        let data = decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        Ok(validate_claims(&data.claims, now)?)
    }
}

impl core::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &Self::ALGORITHM)
            .finish_non_exhaustive()
    }
}
