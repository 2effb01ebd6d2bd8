//! PKCE (Proof Key for Code Exchange) for the authorization code flow.
//!
//! Implements the client side of RFC 7636 with the S256 method only. The
//! "plain" method is rejected.
//!
//! # Example
//!
//! ```
//! use oidc_rp::pkce::{PkceChallenge, PkceChallengeGenerator, PkceChallengeMethod};
//!
//! let params = PkceChallengeGenerator::new().generate();
//! assert_eq!(params.method(), PkceChallengeMethod::S256);
//!
//! // The challenge is a pure function of the verifier.
//! assert_eq!(&PkceChallenge::from_verifier(params.verifier()), params.challenge());
//! ```

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};

use crate::random::random_urlsafe;

/// Shortest verifier allowed by RFC 7636.
pub const MIN_VERIFIER_LENGTH: usize = 43;

/// Longest verifier allowed by RFC 7636.
pub const MAX_VERIFIER_LENGTH: usize = 128;

/// Default verifier entropy: 32 bytes, 43 encoded characters.
pub const DEFAULT_ENTROPY_BYTES: usize = 32;

/// Largest entropy that still encodes within 128 characters.
pub const MAX_ENTROPY_BYTES: usize = 96;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during PKCE operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PkceError {
    /// Verifier length is outside the valid range (43-128 characters).
    #[error("Invalid verifier length: must be 43-128 characters, got {0}")]
    InvalidVerifierLength(usize),

    /// Verifier contains characters outside the unreserved set.
    #[error("Invalid verifier characters: must be unreserved ([A-Za-z0-9-._~])")]
    InvalidVerifierCharacters,

    /// Requested verifier entropy would not encode to 43-128 characters.
    #[error("Invalid verifier entropy: must be 32-96 bytes, got {0}")]
    InvalidEntropyLength(usize),

    /// The verifier does not hash to the challenge.
    #[error("PKCE verification failed: verifier does not match challenge")]
    VerificationFailed,
}

impl PkceError {
    /// Returns `true` if this is a verifier validation error.
    #[must_use]
    pub fn is_verifier_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidVerifierLength(_)
                | Self::InvalidVerifierCharacters
                | Self::InvalidEntropyLength(_)
        )
    }
}

// =============================================================================
// PKCE Challenge Method
// =============================================================================

/// PKCE challenge method. Only S256 exists; `plain` is never sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PkceChallengeMethod {
    /// SHA-256 hash.
    #[default]
    S256,
}

impl PkceChallengeMethod {
    /// The wire value of the method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S256 => "S256",
        }
    }
}

impl std::fmt::Display for PkceChallengeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// PKCE Verifier
// =============================================================================

/// PKCE code verifier.
///
/// 43-128 characters from the unreserved set `[A-Z] / [a-z] / [0-9] / "-" /
/// "." / "_" / "~"`. Generated verifiers are base64url and therefore use a
/// subset of it.
#[derive(Clone, PartialEq, Eq)]
pub struct PkceVerifier(String);

impl PkceVerifier {
    /// Wraps an existing verifier, checking length and alphabet.
    ///
    /// # Errors
    ///
    /// Returns an error if the length is not 43-128 or the string contains
    /// characters other than `[A-Za-z0-9-._~]`.
    pub fn new(verifier: impl Into<String>) -> Result<Self, PkceError> {
        let verifier = verifier.into();
        let len = verifier.len();

        if !(MIN_VERIFIER_LENGTH..=MAX_VERIFIER_LENGTH).contains(&len) {
            return Err(PkceError::InvalidVerifierLength(len));
        }

        if !verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'))
        {
            return Err(PkceError::InvalidVerifierCharacters);
        }

        Ok(Self(verifier))
    }

    /// The verifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PkceVerifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Verifiers are secrets; keep them out of logs.
impl std::fmt::Debug for PkceVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PkceVerifier(..)")
    }
}

// =============================================================================
// PKCE Challenge
// =============================================================================

/// PKCE code challenge: `BASE64URL(SHA256(ASCII(code_verifier)))`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceChallenge(String);

impl PkceChallenge {
    /// Derives the S256 challenge for `verifier`.
    #[must_use]
    pub fn from_verifier(verifier: &PkceVerifier) -> Self {
        let hash = Sha256::digest(verifier.0.as_bytes());
        Self(URL_SAFE_NO_PAD.encode(hash))
    }

    /// Checks that `verifier` hashes to this challenge.
    ///
    /// # Errors
    ///
    /// Returns `PkceError::VerificationFailed` on mismatch.
    pub fn verify(&self, verifier: &PkceVerifier) -> Result<(), PkceError> {
        if *self == Self::from_verifier(verifier) {
            Ok(())
        } else {
            Err(PkceError::VerificationFailed)
        }
    }

    /// The challenge string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PkceChallenge {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// PKCE Parameters
// =============================================================================

/// A verifier with its derived challenge.
///
/// Created once per authorization code flow and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceParameters {
    verifier: PkceVerifier,
    challenge: PkceChallenge,
    method: PkceChallengeMethod,
}

impl PkceParameters {
    /// Derives parameters from an existing verifier.
    #[must_use]
    pub fn from_verifier(verifier: PkceVerifier) -> Self {
        let challenge = PkceChallenge::from_verifier(&verifier);
        Self {
            verifier,
            challenge,
            method: PkceChallengeMethod::S256,
        }
    }

    /// The code verifier, sent to the token endpoint.
    #[must_use]
    pub fn verifier(&self) -> &PkceVerifier {
        &self.verifier
    }

    /// The code challenge, sent to the authorization endpoint.
    #[must_use]
    pub fn challenge(&self) -> &PkceChallenge {
        &self.challenge
    }

    /// The challenge method; always S256.
    #[must_use]
    pub fn method(&self) -> PkceChallengeMethod {
        self.method
    }
}

// =============================================================================
// Generator
// =============================================================================

/// Produces fresh [`PkceParameters`] from the OS CSPRNG.
///
/// The generator is stateless; every call to [`generate`](Self::generate)
/// draws new random bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PkceChallengeGenerator {
    entropy_bytes: usize,
}

impl Default for PkceChallengeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PkceChallengeGenerator {
    /// Generator producing 43-character verifiers from 32 random bytes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entropy_bytes: DEFAULT_ENTROPY_BYTES,
        }
    }

    /// Generator drawing `bytes` random bytes per verifier.
    ///
    /// # Errors
    ///
    /// Returns `PkceError::InvalidEntropyLength` unless `bytes` is 32-96,
    /// the range that encodes to 43-128 characters.
    pub fn with_entropy_bytes(bytes: usize) -> Result<Self, PkceError> {
        if !(DEFAULT_ENTROPY_BYTES..=MAX_ENTROPY_BYTES).contains(&bytes) {
            return Err(PkceError::InvalidEntropyLength(bytes));
        }
        Ok(Self {
            entropy_bytes: bytes,
        })
    }

    /// Generates a new verifier and its S256 challenge.
    #[must_use]
    pub fn generate(&self) -> PkceParameters {
        let verifier = PkceVerifier(random_urlsafe(self.entropy_bytes));
        PkceParameters::from_verifier(verifier)
    }
}

// =============================================================================
// Tests
// =============================================================================
