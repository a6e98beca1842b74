//! HS256 bearer tokens carrying the username and an expiry.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};

const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated username.
    pub username: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

/// Errors raised while issuing or verifying tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// No `Authorization: Bearer` header was supplied.
    #[error("missing bearer token")]
    Missing,
    /// The token's expiry has passed.
    #[error("token expired")]
    Expired,
    /// Signature, algorithm, or structure did not check out.
    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
    /// Signing failed while issuing a token.
    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// Issues and verifies tokens with a symmetric secret fixed at construction.
pub struct TokenAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenAuthority {
    /// Build an authority for `secret`; issued tokens expire after `ttl`.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.set_required_spec_claims(&["exp"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Sign a token for `username` expiring `ttl` from now.
    pub fn issue(&self, username: &str) -> Result<String, TokenError> {
        let claims = Claims {
            username: username.to_string(),
            exp: (OffsetDateTime::now_utc() + self.ttl).unix_timestamp(),
        };
        encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding).map_err(TokenError::Signing)
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|error| match error.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(error),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_round_trips_with_day_long_expiry() {
        let authority = TokenAuthority::new(b"secret", Duration::hours(24));
        let token = authority.issue("alice").expect("token");
        let claims = authority.verify(&token).expect("claims");

        assert_eq!(claims.username, "alice");
        let expected = (OffsetDateTime::now_utc() + Duration::hours(24)).unix_timestamp();
        assert!((claims.exp - expected).abs() <= 5);
    }

    #[test]
    fn other_secret_is_rejected() {
        let issuer = TokenAuthority::new(b"secret", Duration::hours(1));
        let verifier = TokenAuthority::new(b"different", Duration::hours(1));
        let token = issuer.issue("alice").unwrap();
        assert!(matches!(verifier.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let authority = TokenAuthority::new(b"secret", Duration::hours(-2));
        let token = authority.issue("alice").unwrap();
        assert!(matches!(authority.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn garbage_is_invalid() {
        let authority = TokenAuthority::new(b"secret", Duration::hours(1));
        assert!(matches!(
            authority.verify("not.a.token"),
            Err(TokenError::Invalid(_))
        ));
    }
}
