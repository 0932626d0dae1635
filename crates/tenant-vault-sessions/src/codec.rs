//! Token issuance and verification.

use crate::{clock::*, errors::*, types::*};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::Duration;
use zeroize::Zeroizing;

/// Minimum HMAC key length in bytes
pub const MIN_KEY_LENGTH: usize = 32;

/// Signs and verifies identity tokens with a single shared key.
///
/// The key and algorithm are fixed at construction. Verification refuses any
/// token whose header names a different algorithm before the signature is
/// checked, and compares `exp` against the injected clock with no leeway.
pub struct TokenCodec<C: Clock = SystemClock> {
    algorithm: Algorithm,
    issuer: String,
    signing_key: Zeroizing<Vec<u8>>,
    clock: C,
}

impl<C: Clock> TokenCodec<C> {
    /// Create a codec for an HMAC algorithm (HS256, HS384 or HS512)
    pub fn new(signing_key: &[u8], algorithm: Algorithm, issuer: String, clock: C) -> Result<Self> {
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(TokenError::UnsupportedAlgorithm(format!("{:?}", algorithm)));
        }

        if signing_key.len() < MIN_KEY_LENGTH {
            return Err(TokenError::KeyTooShort {
                actual: signing_key.len(),
                minimum: MIN_KEY_LENGTH,
            });
        }

        Ok(Self {
            algorithm,
            issuer,
            signing_key: Zeroizing::new(signing_key.to_vec()),
            clock,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Issue a token asserting `identity` for `ttl`
    pub fn issue(&self, identity: &str, ttl: Duration) -> Result<IssuedToken> {
        if ttl.is_zero() {
            return Err(TokenError::InvalidTtl);
        }

        let now_ms = self.clock.now_millis();
        let ttl_ms = u64::try_from(ttl.as_millis()).map_err(|_| TokenError::InvalidTtl)?;
        let expires_at_ms = now_ms.checked_add(ttl_ms).ok_or(TokenError::InvalidTtl)?;

        // Whole-second `exp` for other readers, rounded up; expiry itself is checked in ms.
        let exp = expires_at_ms.div_ceil(1000);

        let claims = TokenClaims {
            iss: self.issuer.clone(),
            sub: identity.to_string(),
            iat: now_ms / 1000,
            exp,
            exp_ms: expires_at_ms,
        };

        let header = Header::new(self.algorithm);
        let token = encode(&header, &claims, &EncodingKey::from_secret(&self.signing_key))
            .map_err(|e| TokenError::SigningFailure(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_at: exp,
            expires_in: exp.saturating_sub(now_ms / 1000),
            token_type: "Bearer".to_string(),
        })
    }

    /// Verify a token and return the identity it proves
    pub fn verify(&self, token: &str) -> Result<VerifiedIdentity> {
        let claims = self.verify_claims(token)?;
        Ok(VerifiedIdentity::new(claims.sub))
    }

    /// Verify a token and return its full claims
    pub fn verify_claims(&self, token: &str) -> Result<TokenClaims> {
        // Step 1: Parse header WITHOUT verification
        let header = jsonwebtoken::decode_header(token).map_err(|_| TokenError::Malformed)?;

        // Step 2: STRICT algorithm check
        if header.alg != self.algorithm {
            tracing::warn!(
                found = ?header.alg,
                expected = ?self.algorithm,
                "Rejected token signed with unexpected algorithm"
            );
            return Err(TokenError::InvalidAlgorithm {
                found: format!("{:?}", header.alg),
                expected: format!("{:?}", self.algorithm),
            });
        }

        // Step 3: Signature and issuer; expiry is checked against our own clock below
        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        let token_data = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(&self.signing_key),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenError::MalformedSignature,
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Utf8(_) => {
                TokenError::Malformed
            }
            _ => TokenError::Invalid,
        })?;

        let claims = token_data.claims;

        if claims.sub.is_empty() {
            return Err(TokenError::Invalid);
        }

        // Step 4: Expiry, zero leeway, to the millisecond
        let now_ms = self.clock.now_millis();
        if now_ms > claims.exp_ms {
            return Err(TokenError::Expired {
                expired_at: claims.exp,
            });
        }

        Ok(claims)
    }
}
