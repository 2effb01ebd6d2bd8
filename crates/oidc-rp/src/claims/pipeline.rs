//! Ordered ID token validation.
//!
//! The pipeline runs its validators in construction order and stops at the
//! first failure. Validators after a failing one are never invoked.

use super::context::ValidationContext;
use super::token::DecodedToken;
use super::validators::{ClaimValidator, ValidationOutcome, canonical_chain};

/// An ordered chain of [`ClaimValidator`]s with early exit.
///
/// # Example
///
/// ```
/// use oidc_rp::claims::{ClaimError, ClaimsValidationPipeline, DecodedToken, ValidationContext};
///
/// let context = ValidationContext::new("https://auth.example.com/", "client-id");
/// let pipeline = ClaimsValidationPipeline::from_context(&context);
///
/// let token = DecodedToken::new().with_issuer("https://auth.example.com/");
/// assert_eq!(pipeline.validate(&token), Err(ClaimError::MissingSub));
/// ```
#[derive(Debug)]
pub struct ClaimsValidationPipeline {
    validators: Vec<Box<dyn ClaimValidator>>,
}

impl ClaimsValidationPipeline {
    /// Creates a pipeline running `validators` in the given order.
    #[must_use]
    pub fn new(validators: Vec<Box<dyn ClaimValidator>>) -> Self {
        Self { validators }
    }

    /// Creates the standard OIDC pipeline for one login attempt.
    ///
    /// Order: iss, sub, aud, exp, iat, nonce, azp, auth_time, org_id.
    #[must_use]
    pub fn from_context(context: &ValidationContext) -> Self {
        Self::new(canonical_chain(context))
    }

    /// Number of validators in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Returns `true` if the chain has no validators.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Validates `token`, returning the first failure in chain order.
    pub fn validate(&self, token: &DecodedToken) -> ValidationOutcome {
        for validator in &self.validators {
            if let Err(err) = validator.validate(token) {
                tracing::debug!(claim = err.claim(), "ID token rejected: {}", err);
                return Err(err);
            }
        }

        tracing::debug!(
            subject = token.subject().unwrap_or_default(),
            "ID token claims validated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use time::OffsetDateTime;
    use time::macros::datetime;

    use super::*;
    use crate::claims::ClaimError;
    use crate::claims::validators::{IssuerValidator, SubjectValidator};

    const NOW: OffsetDateTime = datetime!(2024-03-01 12:00 UTC);
    const ISSUER: &str = "https://tenant.auth.example.com/";
    const CLIENT_ID: &str = "client-id";
    const NONCE: &str = "a1b2c3d4";

    /// Counts invocations and returns a fixed outcome.
    #[derive(Debug)]
    struct SpyValidator {
        calls: Arc<AtomicUsize>,
        outcome: ValidationOutcome,
    }

    impl SpyValidator {
        fn new(outcome: ValidationOutcome) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    calls: Arc::clone(&calls),
                    outcome,
                },
                calls,
            )
        }
    }

    impl ClaimValidator for SpyValidator {
        fn validate(&self, _token: &DecodedToken) -> ValidationOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn context() -> ValidationContext {
        ValidationContext::new(ISSUER, CLIENT_ID)
            .with_nonce(NONCE)
            .with_base_time(NOW)
    }

    fn valid_token() -> DecodedToken {
        DecodedToken::new()
            .with_issuer(ISSUER)
            .with_subject("auth0|123456789")
            .with_audience([CLIENT_ID])
            .with_expires_at(NOW + Duration::from_secs(3600))
            .with_issued_at(NOW - Duration::from_secs(10))
            .with_nonce(NONCE)
    }

    #[test]
    fn test_valid_token_passes() {
        let pipeline = ClaimsValidationPipeline::from_context(&context());
        assert_eq!(pipeline.len(), 9);
        assert!(pipeline.validate(&valid_token()).is_ok());
    }

    #[test]
    fn test_empty_pipeline_passes() {
        let pipeline = ClaimsValidationPipeline::new(Vec::new());
        assert!(pipeline.is_empty());
        assert!(pipeline.validate(&DecodedToken::new()).is_ok());
    }

    #[test]
    fn test_missing_claims_in_canonical_order() {
        let pipeline = ClaimsValidationPipeline::from_context(&context());

        assert_eq!(
            pipeline.validate(&DecodedToken::new()),
            Err(ClaimError::MissingIss)
        );

        let token = DecodedToken::new().with_issuer(ISSUER);
        assert_eq!(pipeline.validate(&token), Err(ClaimError::MissingSub));

        let token = token.with_subject("user");
        assert_eq!(pipeline.validate(&token), Err(ClaimError::MissingAud));

        let token = token.with_audience([CLIENT_ID]);
        assert_eq!(pipeline.validate(&token), Err(ClaimError::MissingExp));

        let token = token.with_expires_at(NOW + Duration::from_secs(60));
        assert_eq!(pipeline.validate(&token), Err(ClaimError::MissingIat));

        let token = token.with_issued_at(NOW);
        assert_eq!(pipeline.validate(&token), Err(ClaimError::MissingNonce));

        let token = token.with_nonce(NONCE);
        assert!(pipeline.validate(&token).is_ok());
    }

    #[test]
    fn test_short_circuits_after_first_failure() {
        let (first, first_calls) = SpyValidator::new(Ok(()));
        let (after, after_calls) = SpyValidator::new(Ok(()));
        let pipeline = ClaimsValidationPipeline::new(vec![
            Box::new(first),
            Box::new(SubjectValidator),
            Box::new(after),
        ]);

        assert_eq!(
            pipeline.validate(&DecodedToken::new()),
            Err(ClaimError::MissingSub)
        );
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(after_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_first_failure_wins_regardless_of_order() {
        let token = DecodedToken::new().with_issuer("https://other.example.com/");

        let pipeline = ClaimsValidationPipeline::new(vec![
            Box::new(SubjectValidator),
            Box::new(IssuerValidator::new(ISSUER)),
        ]);
        assert_eq!(pipeline.validate(&token), Err(ClaimError::MissingSub));

        let pipeline = ClaimsValidationPipeline::new(vec![
            Box::new(IssuerValidator::new(ISSUER)),
            Box::new(SubjectValidator),
        ]);
        assert_eq!(
            pipeline.validate(&token),
            Err(ClaimError::mismatched_iss("https://other.example.com/", ISSUER))
        );
    }

    #[test]
    fn test_every_missing_claim_stops_the_chain() {
        let (spy, calls) = SpyValidator::new(Ok(()));
        let spy: Box<dyn ClaimValidator> = Box::new(spy);
        let mut validators = crate::claims::validators::canonical_chain(&context());
        // iss, sub, aud, exp, iat, nonce, then the spy
        validators.insert(6, spy);
        let pipeline = ClaimsValidationPipeline::new(validators);

        let full = valid_token();
        let cases: Vec<(DecodedToken, ClaimError)> = vec![
            (strip(&full, "iss"), ClaimError::MissingIss),
            (strip(&full, "sub"), ClaimError::MissingSub),
            (strip(&full, "aud"), ClaimError::MissingAud),
            (strip(&full, "exp"), ClaimError::MissingExp),
            (strip(&full, "iat"), ClaimError::MissingIat),
            (strip(&full, "nonce"), ClaimError::MissingNonce),
        ];

        for (token, expected) in cases {
            assert_eq!(pipeline.validate(&token), Err(expected));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(pipeline.validate(&full).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_conditional_validators_in_pipeline() {
        let context = context()
            .with_max_age(Duration::from_secs(300))
            .with_organization("org_1");
        let pipeline = ClaimsValidationPipeline::from_context(&context);

        let token = valid_token().with_audience([CLIENT_ID, "api"]);
        assert_eq!(pipeline.validate(&token), Err(ClaimError::MissingAzp));

        let token = token.with_authorized_party(CLIENT_ID);
        assert_eq!(pipeline.validate(&token), Err(ClaimError::MissingAuthTime));

        let token = token.with_auth_time(NOW - Duration::from_secs(30));
        assert_eq!(pipeline.validate(&token), Err(ClaimError::MissingOrgId));

        let token = token.with_organization_id("org_1");
        assert!(pipeline.validate(&token).is_ok());
    }

    #[test]
    fn test_far_future_expiration_is_present() {
        let claims = serde_json::json!({
            "iss": ISSUER,
            "sub": "user",
            "aud": CLIENT_ID,
            "exp": 253_402_300_800_u64,
            "iat": NOW.unix_timestamp(),
            "nonce": NONCE
        });
        let token: DecodedToken = serde_json::from_value(claims).unwrap();

        let pipeline = ClaimsValidationPipeline::from_context(&context());
        assert!(pipeline.validate(&token).is_ok());
    }

    /// Rebuilds `token` without the named claim.
    fn strip(token: &DecodedToken, claim: &str) -> DecodedToken {
        let mut out = DecodedToken::new();
        if claim != "iss" {
            if let Some(v) = token.issuer() {
                out = out.with_issuer(v);
            }
        }
        if claim != "sub" {
            if let Some(v) = token.subject() {
                out = out.with_subject(v);
            }
        }
        if claim != "aud" {
            if let Some(v) = token.audience() {
                out = out.with_audience(v.iter().cloned());
            }
        }
        if claim != "exp" {
            if let Some(v) = token.expires_at() {
                out = out.with_expires_at(v);
            }
        }
        if claim != "iat" {
            if let Some(v) = token.issued_at() {
                out = out.with_issued_at(v);
            }
        }
        if claim != "nonce" {
            if let Some(v) = token.nonce() {
                out = out.with_nonce(v);
            }
        }
        out
    }
}
