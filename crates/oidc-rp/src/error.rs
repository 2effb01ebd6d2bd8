//! Grant resolution and transport error types.
//!
//! Two families meet here:
//!
//! - [`AuthenticationError`] - failures reported by the token endpoint
//!   transport. Grants wrap them unchanged.
//! - [`GrantError`] - everything a grant can fail with, including claim
//!   validation failures of an ID token.

use crate::claims::{ClaimError, DecodeError};

/// Errors raised by the token endpoint transport.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    /// The request never produced an HTTP response.
    #[error("Network error: {message}")]
    Network {
        /// Description of the network failure.
        message: String,
    },

    /// The endpoint returned a non-success status without an OAuth error body.
    #[error("Token endpoint returned HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The endpoint returned an OAuth 2.0 error response.
    #[error("OAuth error from token endpoint: {error} - {description}")]
    OAuth {
        /// HTTP status code.
        status: u16,
        /// The OAuth error code, e.g. `invalid_grant`.
        error: String,
        /// Optional error description.
        description: String,
    },

    /// The success body could not be decoded into credentials.
    #[error("Invalid token endpoint response: {message}")]
    InvalidResponse {
        /// Description of the decoding failure.
        message: String,
    },
}

impl AuthenticationError {
    /// Creates a `Network` error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates an `OAuth` error.
    #[must_use]
    pub fn oauth(status: u16, error: impl Into<String>, description: impl Into<String>) -> Self {
        Self::OAuth {
            status,
            error: error.into(),
            description: description.into(),
        }
    }

    /// Creates an `InvalidResponse` error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// HTTP status, when a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::OAuth { status, .. } => Some(*status),
            Self::Network { .. } | Self::InvalidResponse { .. } => None,
        }
    }

    /// Returns `true` if repeating the same exchange may succeed.
    ///
    /// Network failures and 5xx responses are transient; OAuth errors such as
    /// `invalid_grant` are not, since authorization codes are single use.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            Self::OAuth { .. } | Self::InvalidResponse { .. } => false,
        }
    }
}

impl From<reqwest::Error> for AuthenticationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::invalid_response(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

/// Errors that can occur while resolving credentials from a grant.
#[derive(Debug, thiserror::Error)]
pub enum GrantError {
    /// A value the grant requires is absent from the provider response.
    #[error("Missing credentials: {field} not found in the authorization response")]
    MissingCredentials {
        /// Name of the absent field.
        field: String,
    },

    /// The provider redirected back with an OAuth error.
    #[error("Authorization failed: {error} - {description}")]
    Provider {
        /// The OAuth error code, e.g. `access_denied`.
        error: String,
        /// Optional error description.
        description: String,
    },

    /// The ID token could not be decoded or its signature did not verify.
    #[error("ID token could not be decoded: {0}")]
    IdTokenDecode(#[from] DecodeError),

    /// An ID token claim was rejected.
    #[error("ID token validation failed: {0}")]
    ClaimValidation(#[from] ClaimError),

    /// The token endpoint exchange failed.
    #[error("Token exchange failed: {0}")]
    Transport(#[from] AuthenticationError),

    /// The grant was constructed in a way that cannot resolve credentials.
    #[error("Grant misconfigured: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl GrantError {
    /// Creates a `MissingCredentials` error.
    #[must_use]
    pub fn missing_credentials(field: impl Into<String>) -> Self {
        Self::MissingCredentials {
            field: field.into(),
        }
    }

    /// Creates a `Provider` error.
    #[must_use]
    pub fn provider(error: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Provider {
            error: error.into(),
            description: description.into(),
        }
    }

    /// Creates a `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns `true` if the ID token was rejected.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::IdTokenDecode(_) | Self::ClaimValidation(_))
    }

    /// Returns `true` if the failure came from the token endpoint transport.
    #[must_use]
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// The claim error, if this is a claim validation failure.
    #[must_use]
    pub fn claim_error(&self) -> Option<&ClaimError> {
        match self {
            Self::ClaimValidation(err) => Some(err),
            _ => None,
        }
    }
}
