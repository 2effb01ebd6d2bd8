//! Random request values.
//!
//! All values come from the operating system CSPRNG and are base64url
//! encoded without padding.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use rand::rngs::OsRng;

/// Bytes of entropy in `state` and `nonce` values.
const REQUEST_VALUE_BYTES: usize = 32;

/// Encodes `len` fresh random bytes as base64url.
pub(crate) fn random_urlsafe(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generates an OAuth `state` value (43 characters).
#[must_use]
pub fn generate_state() -> String {
    random_urlsafe(REQUEST_VALUE_BYTES)
}

/// Generates an OIDC `nonce` value (43 characters).
#[must_use]
pub fn generate_nonce() -> String {
    random_urlsafe(REQUEST_VALUE_BYTES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lengths() {
        assert_eq!(generate_state().len(), 43);
        assert_eq!(generate_nonce().len(), 43);
        assert_eq!(random_urlsafe(96).len(), 128);
    }

    #[test]
    fn test_uniqueness() {
        assert_ne!(generate_state(), generate_state());
        assert_ne!(generate_nonce(), generate_nonce());
    }

    #[test]
    fn test_urlsafe_alphabet() {
        assert!(
            generate_nonce()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}
