//! ID token claims validation.
//!
//! - [`token`] - Typed view over verified claims
//! - [`decoder`] - Signature verification boundary producing [`DecodedToken`]s
//! - [`context`] - Per-login expectations (issuer, client id, nonce, ...)
//! - [`validators`] - One validator per OIDC claim
//! - [`pipeline`] - Ordered chain with early exit
//! - [`error`] - Claim failures

pub mod context;
pub mod decoder;
pub mod error;
pub mod pipeline;
pub mod token;
pub mod validators;

mod epoch;

pub use context::{DEFAULT_LEEWAY, ValidationContext};
pub use decoder::{DecodeError, IdTokenDecoder, JwtIdTokenDecoder};
pub use error::ClaimError;
pub use pipeline::ClaimsValidationPipeline;
pub use token::DecodedToken;
pub use validators::{
    AudienceValidator, AuthTimeValidator, AuthorizedPartyValidator, ClaimValidator,
    ExpirationValidator, IssuedAtValidator, IssuerValidator, NonceValidator,
    OrganizationValidator, SubjectValidator, ValidationOutcome,
};
