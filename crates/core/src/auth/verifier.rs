//! ID Token verification
//!
//! Checks run in a fixed order and stop at the first failure:
//! structure, signature, issuer, audience, expiry, nonce.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet, KeyAlgorithm, PublicKeyUse};
use jsonwebtoken::{Algorithm, DecodingKey, Header};
use oidc_rp_domain::{IdTokenClaims, VerificationError};
use tracing::debug;

/// What a valid ID Token must assert.
#[derive(Debug, Clone, Copy)]
pub struct Expectations<'a> {
    pub issuer: &'a str,
    /// Our client id; must appear in `aud`.
    pub audience: &'a str,
    /// Login nonce. `None` on the refresh path, which has no nonce to bind.
    pub nonce: Option<&'a str>,
}

/// Verify `raw` against the provider's signing keys.
///
/// # Errors
/// Returns the first [`VerificationError`] encountered.
pub fn verify_id_token(
    raw: &str,
    expected: &Expectations<'_>,
    signing_keys: &JwkSet,
    now: DateTime<Utc>,
) -> Result<IdTokenClaims, VerificationError> {
    let (header, claims, message, signature) = decode(raw)?;

    verify_signature(&header, message, signature, signing_keys)?;

    if claims.issuer != expected.issuer {
        return Err(VerificationError::IssuerMismatch {
            expected: expected.issuer.to_string(),
            found: claims.issuer,
        });
    }

    if !claims.audience.contains(expected.audience) {
        return Err(VerificationError::AudienceMismatch {
            expected: expected.audience.to_string(),
            found: claims.audience.as_slice().to_vec(),
        });
    }

    if claims.expiration <= now.timestamp() {
        return Err(VerificationError::Expired { expired_at: claims.expiration });
    }

    if let Some(nonce) = expected.nonce {
        if claims.nonce.as_deref() != Some(nonce) {
            return Err(VerificationError::NonceMismatch);
        }
    }

    debug!(subject = %claims.subject, exp = claims.expiration, "ID token verified");
    Ok(claims)
}

/// Split a compact JWS and decode its header and claims.
fn decode(raw: &str) -> Result<(Header, IdTokenClaims, &str, &str), VerificationError> {
    let parts: Vec<&str> = raw.split('.').collect();
    let [header_b64, payload_b64, signature] = parts.as_slice() else {
        return Err(VerificationError::Malformed(format!(
            "expected 3 dot-separated parts, found {}",
            parts.len()
        )));
    };
    if signature.is_empty() {
        return Err(VerificationError::Malformed("signature part is empty".to_string()));
    }

    let header = jsonwebtoken::decode_header(raw)
        .map_err(|e| VerificationError::Malformed(format!("header: {e}")))?;

    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|e| VerificationError::Malformed(format!("payload encoding: {e}")))?;
    let claims: IdTokenClaims = serde_json::from_slice(&payload)
        .map_err(|e| VerificationError::Malformed(format!("claims: {e}")))?;

    // Signing input is everything before the last dot.
    let message = &raw[..header_b64.len() + 1 + payload_b64.len()];
    Ok((header, claims, message, *signature))
}

fn verify_signature(
    header: &Header,
    message: &str,
    signature: &str,
    signing_keys: &JwkSet,
) -> Result<(), VerificationError> {
    let kid = header.kid.as_deref();
    let verified = signing_keys
        .keys
        .iter()
        .filter(|jwk| kid.is_none() || jwk.common.key_id.as_deref() == kid)
        .filter(|jwk| key_declared_for(jwk, header.alg))
        .filter(|jwk| key_fits_algorithm(jwk, header.alg))
        .any(|jwk| {
            DecodingKey::from_jwk(jwk)
                .and_then(|key| {
                    jsonwebtoken::crypto::verify(signature, message.as_bytes(), &key, header.alg)
                })
                .unwrap_or(false)
        });

    if verified {
        Ok(())
    } else {
        debug!(kid = ?kid, alg = ?header.alg, "no signing key validated ID token");
        Err(VerificationError::BadSignature)
    }
}

/// Honour the key's own `use` and `alg` members when the provider sets them.
fn key_declared_for(jwk: &Jwk, alg: Algorithm) -> bool {
    if matches!(jwk.common.public_key_use, Some(PublicKeyUse::Encryption)) {
        return false;
    }
    match jwk.common.key_algorithm {
        Some(declared) => signing_algorithm(declared) == Some(alg),
        None => true,
    }
}

fn signing_algorithm(alg: KeyAlgorithm) -> Option<Algorithm> {
    match alg {
        KeyAlgorithm::HS256 => Some(Algorithm::HS256),
        KeyAlgorithm::HS384 => Some(Algorithm::HS384),
        KeyAlgorithm::HS512 => Some(Algorithm::HS512),
        KeyAlgorithm::ES256 => Some(Algorithm::ES256),
        KeyAlgorithm::ES384 => Some(Algorithm::ES384),
        KeyAlgorithm::RS256 => Some(Algorithm::RS256),
        KeyAlgorithm::RS384 => Some(Algorithm::RS384),
        KeyAlgorithm::RS512 => Some(Algorithm::RS512),
        KeyAlgorithm::PS256 => Some(Algorithm::PS256),
        KeyAlgorithm::PS384 => Some(Algorithm::PS384),
        KeyAlgorithm::PS512 => Some(Algorithm::PS512),
        KeyAlgorithm::EdDSA => Some(Algorithm::EdDSA),
        // Key-encryption algorithms never verify a signature.
        _ => None,
    }
}

/// A key can only check signatures of its own family; jsonwebtoken panics
/// when handed e.g. an RSA key for an HMAC algorithm.
fn key_fits_algorithm(jwk: &Jwk, alg: Algorithm) -> bool {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(_) => matches!(
            alg,
            Algorithm::RS256
                | Algorithm::RS384
                | Algorithm::RS512
                | Algorithm::PS256
                | Algorithm::PS384
                | Algorithm::PS512
        ),
        AlgorithmParameters::EllipticCurve(_) => {
            matches!(alg, Algorithm::ES256 | Algorithm::ES384)
        }
        AlgorithmParameters::OctetKey(_) => {
            matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
        }
        AlgorithmParameters::OctetKeyPair(_) => alg == Algorithm::EdDSA,
    }
}
