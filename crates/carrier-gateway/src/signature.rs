//! Webhook request signatures.
//!
//! The carrier signs each webhook with HMAC-SHA1 keyed by the account auth
//! token. The signed string is the full request URL followed by every form
//! field, sorted by key, written as `key` immediately followed by `value`.
//! The digest travels base64-encoded in [`SIGNATURE_HEADER`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::error::GatewayError;

type HmacSha1 = Hmac<Sha1>;

/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "x-twilio-signature";

fn signing_mac(auth_token: &str, url: &str, params: &[(String, String)]) -> Result<HmacSha1, GatewayError> {
    let mut mac = HmacSha1::new_from_slice(auth_token.as_bytes())
        .map_err(|e| GatewayError::Signature(e.to_string()))?;

    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort();

    mac.update(url.as_bytes());
    for (key, value) in sorted {
        mac.update(key.as_bytes());
        mac.update(value.as_bytes());
    }
    Ok(mac)
}

/// Compute the base64 signature the carrier would send for this request.
pub fn compute_signature(
    auth_token: &str,
    url: &str,
    params: &[(String, String)],
) -> Result<String, GatewayError> {
    let mac = signing_mac(auth_token, url, params)?;
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Check a supplied signature against the request. Anything that is not
/// the exact expected digest fails.
pub fn validate_signature(auth_token: &str, url: &str, params: &[(String, String)], signature: &str) -> bool {
    let Ok(supplied) = STANDARD.decode(signature.trim()) else {
        return false;
    };
    match signing_mac(auth_token, url, params) {
        Ok(mac) => mac.verify_slice(&supplied).is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_published_vector() {
        let params = pairs(&[
            ("CallSid", "CA1234567890ABCDE"),
            ("Caller", "+12349013030"),
            ("Digits", "1234"),
            ("From", "+12349013030"),
            ("To", "+18005551212"),
        ]);
        let url = "https://mycompany.com/myapp.php?foo=1&bar=2";

        let signature = compute_signature("12345", url, &params).unwrap();
        assert_eq!(signature, "0/KCTR6DLpKmkAf8muzZqo1nDgQ=");
        assert!(validate_signature("12345", url, &params, &signature));
    }

    #[test]
    fn test_field_order_does_not_matter() {
        let url = "https://example.com/webhooks/sms";
        let params = pairs(&[
            ("To", "+15550000001"),
            ("MessageSid", "SM123"),
            ("From", "+15551234567"),
            ("Body", "Hello"),
        ]);
        let signature = compute_signature("secret", url, &params).unwrap();
        assert_eq!(signature, "ojtQwPCGCEAd5ATCvF9X5SbunfU=");
    }

    #[test]
    fn test_tampering_fails_validation() {
        let url = "https://example.com/webhooks/sms";
        let params = pairs(&[("Body", "Hello"), ("From", "+15551234567")]);
        let signature = compute_signature("secret", url, &params).unwrap();

        let tampered = pairs(&[("Body", "Hello!"), ("From", "+15551234567")]);
        assert!(!validate_signature("secret", url, &tampered, &signature));
        assert!(!validate_signature("other", url, &params, &signature));
        assert!(!validate_signature("secret", "https://example.com/other", &params, &signature));
        assert!(!validate_signature("secret", url, &params, "not base64!"));
        assert!(!validate_signature("secret", url, &params, ""));
    }
}
