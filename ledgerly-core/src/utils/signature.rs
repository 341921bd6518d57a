use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Compute the hex-encoded HMAC-SHA256 of a raw request body.
///
/// The exact bytes received on the wire must be used; re-serializing the
/// payload would change whitespace or key order and break verification.
pub fn compute_signature(secret: &str, body: &[u8]) -> Result<String, anyhow::Error> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| anyhow::anyhow!("Invalid key length: {}", e))?;

    mac.update(body);
    let result = mac.finalize();

    Ok(hex::encode(result.into_bytes()))
}

/// Strip the optional `sha256=` prefix; both bare-hex and prefixed forms are
/// accepted on the wire.
pub fn normalize_signature(provided: &str) -> &str {
    provided.strip_prefix("sha256=").unwrap_or(provided)
}

/// Verify an HMAC-SHA256 signature over a raw body using constant-time
/// comparison.
pub fn verify_signature(secret: &str, body: &[u8], provided: &str) -> Result<bool, anyhow::Error> {
    let expected = compute_signature(secret, body)?;
    let provided = normalize_signature(provided);

    let expected_bytes = expected.as_bytes();
    let provided_bytes = provided.as_bytes();

    if expected_bytes.len() != provided_bytes.len() {
        return Ok(false);
    }

    Ok(expected_bytes.ct_eq(provided_bytes).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_round_trip() {
        let secret = "my_secret_key";
        let body = br#"[{"client_id":"abc"}]"#;

        let signature = compute_signature(secret, body).unwrap();
        assert!(!signature.is_empty());

        let is_valid = verify_signature(secret, body, &signature).unwrap();
        assert!(is_valid);
    }

    #[test]
    fn test_prefixed_signature_verifies() {
        let secret = "my_secret_key";
        let body = br#"{"events":[]}"#;

        let signature = compute_signature(secret, body).unwrap();
        let prefixed = format!("sha256={}", signature);

        let is_valid = verify_signature(secret, body, &prefixed).unwrap();
        assert!(is_valid);
    }

    #[test]
    fn test_tampered_body_fails() {
        let secret = "my_secret_key";
        let body = br#"[{"amount":100}]"#;

        let signature = compute_signature(secret, body).unwrap();

        let tampered = br#"[{"amount":101}]"#;
        let is_valid = verify_signature(secret, tampered, &signature).unwrap();
        assert!(!is_valid);
    }

    #[test]
    fn test_invalid_signature_fails() {
        let secret = "my_secret_key";
        let body = br#"[{"amount":100}]"#;

        let signature = compute_signature(secret, body).unwrap();
        let replacement = if signature.starts_with('0') { "1" } else { "0" };
        let flipped = format!("{}{}", replacement, &signature[1..]);

        let is_valid = verify_signature(secret, body, &flipped).unwrap();
        assert!(!is_valid);
    }

    #[test]
    fn test_wrong_length_signature_fails() {
        let secret = "my_secret_key";
        let body = b"payload";

        let is_valid = verify_signature(secret, body, "deadbeef").unwrap();
        assert!(!is_valid);
    }
}
