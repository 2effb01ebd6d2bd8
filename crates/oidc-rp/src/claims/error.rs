//! ID token claim validation errors.
//!
//! Every variant names exactly one claim and carries the observed and
//! expected values (or the reference time and computed deadline), so the
//! description can be rendered without access to the validation context.

use time::OffsetDateTime;

/// A rejected ID token claim.
///
/// Claim errors are terminal: the token must be discarded and the login
/// attempt restarted with a fresh authorization request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClaimError {
    /// The `iss` claim is absent.
    #[error("Issuer (iss) claim must be a string present in the ID token")]
    MissingIss,

    /// The `iss` claim does not equal the expected issuer.
    #[error("Issuer (iss) claim mismatch in the ID token, expected ({expected}), found ({actual})")]
    MismatchedIss {
        /// Issuer found in the token.
        actual: String,
        /// Issuer the relying party expects.
        expected: String,
    },

    /// The `sub` claim is absent.
    #[error("Subject (sub) claim must be a string present in the ID token")]
    MissingSub,

    /// The `aud` claim is absent.
    #[error("Audience (aud) claim must be a string or array of strings present in the ID token")]
    MissingAud,

    /// The single-valued `aud` claim does not equal the client id.
    #[error("Audience (aud) claim mismatch in the ID token; expected ({expected}) but found ({actual})")]
    MismatchedAudString {
        /// Audience found in the token.
        actual: String,
        /// Client id the relying party expects.
        expected: String,
    },

    /// The multi-valued `aud` claim does not contain the client id.
    #[error("Audience (aud) claim mismatch in the ID token; expected ({expected}) but was not one of ({})", actual.join(", "))]
    MismatchedAudArray {
        /// Audiences found in the token.
        actual: Vec<String>,
        /// Client id the relying party expects.
        expected: String,
    },

    /// The `exp` claim is absent.
    #[error("Expiration time (exp) claim must be a number present in the ID token")]
    MissingExp,

    /// The token expired before the reference time, leeway included.
    #[error("Expiration time (exp) claim error in the ID token; current time ({base_time}) is after expiration time ({expiration})")]
    PastExp {
        /// Reference time the token was checked against.
        base_time: OffsetDateTime,
        /// Expiration time with leeway added.
        expiration: OffsetDateTime,
    },

    /// The `iat` claim is absent.
    #[error("Issued At (iat) claim must be a number present in the ID token")]
    MissingIat,

    /// The `nonce` claim is absent.
    #[error("Nonce (nonce) claim must be a string present in the ID token")]
    MissingNonce,

    /// The `nonce` claim does not echo the nonce sent with the request.
    #[error("Nonce (nonce) claim value mismatch in the ID token; expected ({expected}), found ({actual})")]
    MismatchedNonce {
        /// Nonce found in the token.
        actual: String,
        /// Nonce sent with the authorization request.
        expected: String,
    },

    /// The `azp` claim is absent while the audience has several entries.
    #[error("Authorized Party (azp) claim must be a string present in the ID token when Audience (aud) claim has multiple values")]
    MissingAzp,

    /// The `azp` claim does not equal the client id.
    #[error("Authorized Party (azp) claim mismatch in the ID token; expected ({expected}), found ({actual})")]
    MismatchedAzp {
        /// Authorized party found in the token.
        actual: String,
        /// Client id the relying party expects.
        expected: String,
    },

    /// The `auth_time` claim is absent while a max age was requested.
    #[error("Authentication Time (auth_time) claim must be a number present in the ID token when Max Age (max_age) is specified")]
    MissingAuthTime,

    /// The end-user authenticated too long ago for the requested max age.
    #[error("Authentication Time (auth_time) claim in the ID token indicates that too much time has passed since the last end-user authentication. Current time ({base_time}) is after last auth time ({last_auth})")]
    PastLastAuth {
        /// Reference time the token was checked against.
        base_time: OffsetDateTime,
        /// Last acceptable authentication instant (`auth_time + max_age + leeway`).
        last_auth: OffsetDateTime,
    },

    /// The `org_id` claim is absent while an organization was requested.
    #[error("Organization Id (org_id) claim must be a string present in the ID token")]
    MissingOrgId,

    /// The `org_id` claim does not equal the requested organization.
    #[error("Organization Id (org_id) claim value mismatch in the ID token; expected ({expected}), found ({actual})")]
    MismatchedOrgId {
        /// Organization found in the token.
        actual: String,
        /// Organization requested for the login.
        expected: String,
    },
}

impl ClaimError {
    /// Creates a `MismatchedIss` error.
    #[must_use]
    pub fn mismatched_iss(actual: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::MismatchedIss {
            actual: actual.into(),
            expected: expected.into(),
        }
    }

    /// Creates a `MismatchedAudString` error.
    #[must_use]
    pub fn mismatched_aud_string(actual: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::MismatchedAudString {
            actual: actual.into(),
            expected: expected.into(),
        }
    }

    /// Creates a `MismatchedAudArray` error.
    #[must_use]
    pub fn mismatched_aud_array(actual: Vec<String>, expected: impl Into<String>) -> Self {
        Self::MismatchedAudArray {
            actual,
            expected: expected.into(),
        }
    }

    /// Creates a `MismatchedNonce` error.
    #[must_use]
    pub fn mismatched_nonce(actual: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::MismatchedNonce {
            actual: actual.into(),
            expected: expected.into(),
        }
    }

    /// Creates a `MismatchedAzp` error.
    #[must_use]
    pub fn mismatched_azp(actual: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::MismatchedAzp {
            actual: actual.into(),
            expected: expected.into(),
        }
    }

    /// Creates a `MismatchedOrgId` error.
    #[must_use]
    pub fn mismatched_org_id(actual: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::MismatchedOrgId {
            actual: actual.into(),
            expected: expected.into(),
        }
    }

    /// Name of the claim this error refers to.
    #[must_use]
    pub fn claim(&self) -> &'static str {
        match self {
            Self::MissingIss | Self::MismatchedIss { .. } => "iss",
            Self::MissingSub => "sub",
            Self::MissingAud | Self::MismatchedAudString { .. } | Self::MismatchedAudArray { .. } => {
                "aud"
            }
            Self::MissingExp | Self::PastExp { .. } => "exp",
            Self::MissingIat => "iat",
            Self::MissingNonce | Self::MismatchedNonce { .. } => "nonce",
            Self::MissingAzp | Self::MismatchedAzp { .. } => "azp",
            Self::MissingAuthTime | Self::PastLastAuth { .. } => "auth_time",
            Self::MissingOrgId | Self::MismatchedOrgId { .. } => "org_id",
        }
    }

    /// Returns `true` if the claim was absent from the token.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            Self::MissingIss
                | Self::MissingSub
                | Self::MissingAud
                | Self::MissingExp
                | Self::MissingIat
                | Self::MissingNonce
                | Self::MissingAzp
                | Self::MissingAuthTime
                | Self::MissingOrgId
        )
    }

    /// Returns `true` if a time-based claim was past its deadline.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::PastExp { .. } | Self::PastLastAuth { .. })
    }
}
