use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Header the provider sends the body signature in.
pub const SIGNATURE_HEADER: &str = "X-Neynar-Signature";

/// Verify the hex HMAC-SHA512 of the raw request body. Any decode or length
/// problem counts as a failed verification, not an error.
pub fn verify(secret: &str, body: &[u8], signature_hex: &str) -> bool {
    let Ok(expected) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha512::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
pub(crate) fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_signature() {
        let body = br#"{"event":"frame.added","fid":42}"#;
        let sig = sign("topsecret", body);
        assert!(verify("topsecret", body, &sig));
        // Whitespace around the header value is tolerated
        assert!(verify("topsecret", body, &format!(" {sig} ")));
    }

    #[test]
    fn rejects_wrong_secret_or_tampered_body() {
        let body = br#"{"event":"frame.added","fid":42}"#;
        let sig = sign("topsecret", body);
        assert!(!verify("othersecret", body, &sig));
        assert!(!verify("topsecret", br#"{"event":"frame.added","fid":43}"#, &sig));
    }

    #[test]
    fn rejects_garbage_signatures() {
        let body = b"{}";
        assert!(!verify("topsecret", body, "not-hex"));
        assert!(!verify("topsecret", body, ""));
        assert!(!verify("topsecret", body, "deadbeef"));
    }
}
