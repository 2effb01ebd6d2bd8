//! Per-claim ID token validators.
//!
//! Each validator checks one claim and is stateless apart from the settings
//! captured at construction. The conditional validators ([`AuthorizedPartyValidator`],
//! [`AuthTimeValidator`], [`OrganizationValidator`]) always sit in the chain and
//! pass immediately when their precondition does not hold.
//!
//! Time comparisons add leeway (and max age) to the claim value in floating
//! epoch seconds and reject when the result is not strictly after the base time.

use std::fmt;
use std::time::Duration;

use time::OffsetDateTime;

use super::context::ValidationContext;
use super::epoch;
use super::error::ClaimError;
use super::token::DecodedToken;

/// Result of a single validator: pass, or the first claim failure.
pub type ValidationOutcome = Result<(), ClaimError>;

/// A single ID token claim check.
pub trait ClaimValidator: fmt::Debug + Send + Sync {
    /// Checks the token, returning the failure for this validator's claim.
    fn validate(&self, token: &DecodedToken) -> ValidationOutcome;
}

// =============================================================================
// iss
// =============================================================================

/// Requires `iss` to equal the expected issuer exactly.
///
/// The comparison is case-sensitive and a trailing slash is significant.
#[derive(Debug, Clone)]
pub struct IssuerValidator {
    expected: String,
}

impl IssuerValidator {
    /// Creates a validator for the given issuer URL.
    #[must_use]
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl ClaimValidator for IssuerValidator {
    fn validate(&self, token: &DecodedToken) -> ValidationOutcome {
        let actual = token.issuer().ok_or(ClaimError::MissingIss)?;
        if actual != self.expected {
            return Err(ClaimError::mismatched_iss(actual, &self.expected));
        }
        Ok(())
    }
}

// =============================================================================
// sub
// =============================================================================

/// Requires `sub` to be present.
#[derive(Debug, Clone, Default)]
pub struct SubjectValidator;

impl ClaimValidator for SubjectValidator {
    fn validate(&self, token: &DecodedToken) -> ValidationOutcome {
        token.subject().map(|_| ()).ok_or(ClaimError::MissingSub)
    }
}

// =============================================================================
// aud
// =============================================================================

/// Requires the client id to be the audience, or one of the audiences.
#[derive(Debug, Clone)]
pub struct AudienceValidator {
    client_id: String,
}

impl AudienceValidator {
    /// Creates a validator for the given client id.
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
        }
    }
}

impl ClaimValidator for AudienceValidator {
    fn validate(&self, token: &DecodedToken) -> ValidationOutcome {
        let audience = token.audience().ok_or(ClaimError::MissingAud)?;
        match audience {
            [single] if single != &self.client_id => {
                Err(ClaimError::mismatched_aud_string(single, &self.client_id))
            }
            [_] => Ok(()),
            many if !many.contains(&self.client_id) => Err(ClaimError::mismatched_aud_array(
                many.to_vec(),
                &self.client_id,
            )),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// exp
// =============================================================================

/// Requires `exp + leeway` to be strictly after the base time.
#[derive(Debug, Clone)]
pub struct ExpirationValidator {
    base_time: OffsetDateTime,
    leeway: Duration,
}

impl ExpirationValidator {
    /// Creates a validator anchored at `base_time`.
    #[must_use]
    pub fn new(base_time: OffsetDateTime, leeway: Duration) -> Self {
        Self { base_time, leeway }
    }
}

impl ClaimValidator for ExpirationValidator {
    fn validate(&self, token: &DecodedToken) -> ValidationOutcome {
        let expires_at = token.expires_at().ok_or(ClaimError::MissingExp)?;
        let deadline = epoch::add(epoch::to_seconds(expires_at), &[self.leeway]);
        if deadline <= epoch::to_seconds(self.base_time) {
            return Err(ClaimError::PastExp {
                base_time: self.base_time,
                expiration: epoch::saturating_from_seconds(deadline),
            });
        }
        Ok(())
    }
}

// =============================================================================
// iat
// =============================================================================

/// Requires `iat` to be present.
#[derive(Debug, Clone, Default)]
pub struct IssuedAtValidator;

impl ClaimValidator for IssuedAtValidator {
    fn validate(&self, token: &DecodedToken) -> ValidationOutcome {
        token.issued_at().map(|_| ()).ok_or(ClaimError::MissingIat)
    }
}

// =============================================================================
// nonce
// =============================================================================

/// Requires `nonce` to echo the nonce sent with the authorization request.
///
/// Passes when no nonce was sent.
#[derive(Debug, Clone)]
pub struct NonceValidator {
    expected: Option<String>,
}

impl NonceValidator {
    /// Creates a validator expecting `nonce`.
    #[must_use]
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: Some(expected.into()),
        }
    }

    /// Creates a validator for a request that carried no nonce.
    #[must_use]
    pub fn not_requested() -> Self {
        Self { expected: None }
    }
}

impl ClaimValidator for NonceValidator {
    fn validate(&self, token: &DecodedToken) -> ValidationOutcome {
        let Some(expected) = self.expected.as_deref() else {
            return Ok(());
        };
        let actual = token.nonce().ok_or(ClaimError::MissingNonce)?;
        if actual != expected {
            return Err(ClaimError::mismatched_nonce(actual, expected));
        }
        Ok(())
    }
}

// =============================================================================
// azp
// =============================================================================

/// Requires `azp` to equal the client id when the audience has several entries.
#[derive(Debug, Clone)]
pub struct AuthorizedPartyValidator {
    client_id: String,
}

impl AuthorizedPartyValidator {
    /// Creates a validator for the given client id.
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
        }
    }
}

impl ClaimValidator for AuthorizedPartyValidator {
    fn validate(&self, token: &DecodedToken) -> ValidationOutcome {
        let multi_audience = token.audience().is_some_and(|aud| aud.len() > 1);
        if !multi_audience {
            return Ok(());
        }
        let actual = token.authorized_party().ok_or(ClaimError::MissingAzp)?;
        if actual != self.client_id {
            return Err(ClaimError::mismatched_azp(actual, &self.client_id));
        }
        Ok(())
    }
}

// =============================================================================
// auth_time
// =============================================================================

/// Requires `auth_time + max_age + leeway` to be strictly after the base time
/// when a max age was requested.
#[derive(Debug, Clone)]
pub struct AuthTimeValidator {
    base_time: OffsetDateTime,
    leeway: Duration,
    max_age: Option<Duration>,
}

impl AuthTimeValidator {
    /// Creates a validator; `max_age` of `None` disables the check.
    #[must_use]
    pub fn new(base_time: OffsetDateTime, leeway: Duration, max_age: Option<Duration>) -> Self {
        Self {
            base_time,
            leeway,
            max_age,
        }
    }
}

impl ClaimValidator for AuthTimeValidator {
    fn validate(&self, token: &DecodedToken) -> ValidationOutcome {
        let Some(max_age) = self.max_age else {
            return Ok(());
        };
        let auth_time = token.auth_time().ok_or(ClaimError::MissingAuthTime)?;
        let last_auth = epoch::add(epoch::to_seconds(auth_time), &[max_age, self.leeway]);
        if last_auth <= epoch::to_seconds(self.base_time) {
            return Err(ClaimError::PastLastAuth {
                base_time: self.base_time,
                last_auth: epoch::saturating_from_seconds(last_auth),
            });
        }
        Ok(())
    }
}

// =============================================================================
// org_id
// =============================================================================

/// Requires `org_id` to equal the requested organization, when one was requested.
#[derive(Debug, Clone)]
pub struct OrganizationValidator {
    expected: Option<String>,
}

impl OrganizationValidator {
    /// Creates a validator; `None` disables the check.
    #[must_use]
    pub fn new(expected: Option<String>) -> Self {
        Self { expected }
    }
}

impl ClaimValidator for OrganizationValidator {
    fn validate(&self, token: &DecodedToken) -> ValidationOutcome {
        let Some(expected) = self.expected.as_deref() else {
            return Ok(());
        };
        let actual = token.organization_id().ok_or(ClaimError::MissingOrgId)?;
        if actual != expected {
            return Err(ClaimError::mismatched_org_id(actual, expected));
        }
        Ok(())
    }
}

/// Builds the validators for `context` in canonical order:
/// iss, sub, aud, exp, iat, nonce, azp, auth_time, org_id.
pub(crate) fn canonical_chain(context: &ValidationContext) -> Vec<Box<dyn ClaimValidator>> {
    let nonce = match context.nonce() {
        Some(nonce) => NonceValidator::new(nonce),
        None => NonceValidator::not_requested(),
    };

    vec![
        Box::new(IssuerValidator::new(context.issuer())),
        Box::new(SubjectValidator),
        Box::new(AudienceValidator::new(context.audience())),
        Box::new(ExpirationValidator::new(
            context.base_time(),
            context.leeway(),
        )),
        Box::new(IssuedAtValidator),
        Box::new(nonce),
        Box::new(AuthorizedPartyValidator::new(context.audience())),
        Box::new(AuthTimeValidator::new(
            context.base_time(),
            context.leeway(),
            context.max_age(),
        )),
        Box::new(OrganizationValidator::new(
            context.organization().map(String::from),
        )),
    ]
}
