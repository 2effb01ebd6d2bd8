//! ID token decoding.
//!
//! Decoding turns a compact JWT into a [`DecodedToken`] after checking its
//! structure and signature. Claim semantics are left to the
//! [`ClaimsValidationPipeline`](super::ClaimsValidationPipeline).

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde_json::{Map, Value};

use super::token::DecodedToken;

/// Errors produced while decoding an ID token.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The token is not a well-formed JWT.
    #[error("Malformed ID token: {message}")]
    Malformed {
        /// Description of the structural problem.
        message: String,
    },

    /// The signature did not verify against the configured key.
    #[error("ID token signature is invalid")]
    InvalidSignature,

    /// The token header names an algorithm other than the configured one.
    #[error("ID token algorithm is not allowed: {message}")]
    InvalidAlgorithm {
        /// Description of the algorithm problem.
        message: String,
    },
}

impl DecodeError {
    /// Creates a `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for DecodeError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                Self::InvalidAlgorithm {
                    message: err.to_string(),
                }
            }
            _ => Self::malformed(err.to_string()),
        }
    }
}

/// Turns a raw ID token into verified claims.
///
/// Implementations must reject unsigned or tampered tokens; whatever they
/// return is trusted by the claims pipeline.
pub trait IdTokenDecoder: Send + Sync {
    /// Decodes and verifies `id_token`.
    fn decode(&self, id_token: &str) -> Result<DecodedToken, DecodeError>;
}

/// [`IdTokenDecoder`] backed by `jsonwebtoken` with a single verification key.
///
/// Only the signature and header algorithm are checked here. `exp`, `aud`
/// and the other registered claims are deliberately not enforced by
/// `jsonwebtoken` so that the pipeline reports them with its own errors.
#[derive(Clone)]
pub struct JwtIdTokenDecoder {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdTokenDecoder {
    /// Creates a decoder that accepts tokens signed with `algorithm` by `key`.
    #[must_use]
    pub fn new(key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims::<&str>(&[]);

        Self { key, validation }
    }
}

impl std::fmt::Debug for JwtIdTokenDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIdTokenDecoder")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

impl IdTokenDecoder for JwtIdTokenDecoder {
    fn decode(&self, id_token: &str) -> Result<DecodedToken, DecodeError> {
        let data = decode::<Map<String, Value>>(id_token, &self.key, &self.validation)?;
        Ok(DecodedToken::from_claims(data.claims))
    }
}
