//! HMAC-SHA256 webhook signature validation.
//!
//! Tebex signs the lower-case hex SHA-256 digest of the body, not the body itself:
//!
//! ```text
//! x-signature = hex(HMAC_SHA256(secret, hex(SHA256(body))))
//! ```

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::error::{signature_error, Error, SignatureErrorKind};

type HmacSha256 = Hmac<Sha256>;

/// Verify `signature` (hex, either case) against `body` using the shared `secret`.
///
/// An empty `secret` skips verification and always succeeds. This is an escape
/// hatch for local development and tests where no webhook secret is configured.
pub fn verify_signature(body: &[u8], signature: &str, secret: &[u8]) -> Result<(), Error> {
    if secret.is_empty() {
        return Ok(());
    }

    let provided = hex::decode(signature)
        .map_err(|_| signature_error(SignatureErrorKind::InvalidSignature))?;

    body_mac(body, secret)?
        .verify_slice(&provided)
        .map_err(|_| signature_error(SignatureErrorKind::InvalidSignature))
}

/// Compute the lower-case hex signature Tebex would send for `body`.
pub fn sign_payload(body: &[u8], secret: &[u8]) -> Result<String, Error> {
    Ok(hex::encode(body_mac(body, secret)?.finalize().into_bytes()))
}

fn body_mac(body: &[u8], secret: &[u8]) -> Result<HmacSha256, Error> {
    let body_hash = hex::encode(Sha256::digest(body));

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|_| signature_error(SignatureErrorKind::InvalidSignature))?;
    mac.update(body_hash.as_bytes());
    Ok(mac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const SECRET: &[u8] = b"s3cr3t";
    const BODY: &[u8] = br#"{"id":"evt_1","type":"validation.webhook","date":"2024-01-01T00:00:00Z","subject":{}}"#;

    fn assert_invalid(result: Result<(), Error>) {
        let err = result.unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Signature(SignatureErrorKind::InvalidSignature)
        );
    }

    #[test]
    fn test_signature_matches_hmac_of_hex_digest() {
        let inner = hex::encode(Sha256::digest(BODY));
        let mut mac = HmacSha256::new_from_slice(SECRET).unwrap();
        mac.update(inner.as_bytes());
        let expected = hex::encode(mac.finalize().into_bytes());

        assert_eq!(sign_payload(BODY, SECRET).unwrap(), expected);
        assert_eq!(expected.len(), 64);
    }

    #[test]
    fn test_valid_signature() {
        let signature = sign_payload(BODY, SECRET).unwrap();
        assert!(verify_signature(BODY, &signature, SECRET).is_ok());
    }

    #[test]
    fn test_upper_case_signature_is_accepted() {
        let signature = sign_payload(BODY, SECRET).unwrap().to_uppercase();
        assert!(verify_signature(BODY, &signature, SECRET).is_ok());
    }

    #[test]
    fn test_hmac_of_raw_body_is_rejected() {
        let mut mac = HmacSha256::new_from_slice(SECRET).unwrap();
        mac.update(BODY);
        let raw_body_signature = hex::encode(mac.finalize().into_bytes());

        assert_invalid(verify_signature(BODY, &raw_body_signature, SECRET));
    }

    #[test]
    fn test_mutated_body_is_rejected() {
        let signature = sign_payload(BODY, SECRET).unwrap();
        for index in [0, BODY.len() / 2, BODY.len() - 1] {
            let mut body = BODY.to_vec();
            body[index] ^= 0x01;
            assert_invalid(verify_signature(&body, &signature, SECRET));
        }
    }

    #[test]
    fn test_mutated_signature_is_rejected() {
        let signature = sign_payload(BODY, SECRET).unwrap();
        let mut bytes = hex::decode(&signature).unwrap();
        bytes[7] ^= 0x80;
        assert_invalid(verify_signature(BODY, &hex::encode(bytes), SECRET));
    }

    #[test]
    fn test_mutated_secret_is_rejected() {
        let signature = sign_payload(BODY, SECRET).unwrap();
        assert_invalid(verify_signature(BODY, &signature, b"s3cr3u"));
    }

    #[test]
    fn test_non_hex_signature_is_rejected() {
        assert_invalid(verify_signature(BODY, "not-a-signature", SECRET));
    }

    #[test]
    fn test_short_signature_is_rejected() {
        assert_invalid(verify_signature(BODY, "deadbeef", SECRET));
    }

    #[test]
    fn test_empty_secret_skips_verification() {
        assert!(verify_signature(BODY, "deadbeef", b"").is_ok());
        assert!(verify_signature(b"anything", "zz", b"").is_ok());
        assert!(verify_signature(b"", "", b"").is_ok());
    }
}
