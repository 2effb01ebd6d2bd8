//! # oidc-rp
//!
//! OpenID Connect relying-party core.
//!
//! This crate provides:
//! - ID token claim validation as an ordered, short-circuiting pipeline
//! - PKCE (RFC 7636) verifier and challenge generation
//! - Implicit and authorization-code-with-PKCE grant resolution
//! - Authorization URL building and redirect parsing
//!
//! ## Overview
//!
//! A login starts with an [`AuthorizeRequest`] built from a [`Grant`]. When the
//! provider redirects back, [`values_from_redirect`] collects the returned
//! parameters and the grant turns them into [`Credentials`]. ID tokens are
//! checked claim by claim by a [`ClaimsValidationPipeline`]; the first failing
//! claim is reported as a [`ClaimError`].
//!
//! ## Modules
//!
//! - [`claims`] - ID token claims, validators and the validation pipeline
//! - [`pkce`] - PKCE verifier and challenge generation
//! - [`grant`] - Implicit and PKCE grants
//! - [`transport`] - Token endpoint exchange
//! - [`authorize`] - Authorization URL building
//! - [`callback`] - Redirect URI parsing
//! - [`config`] - Relying party configuration
//! - [`credentials`] - Tokens returned by a grant
//! - [`error`] - Grant and transport errors

pub mod authorize;
pub mod callback;
pub mod claims;
pub mod config;
pub mod credentials;
pub mod error;
pub mod grant;
pub mod pkce;
pub mod random;
pub mod transport;

pub use authorize::AuthorizeRequest;
pub use callback::values_from_redirect;
pub use claims::{
    ClaimError, ClaimValidator, ClaimsValidationPipeline, DecodeError, DecodedToken,
    IdTokenDecoder, JwtIdTokenDecoder, ValidationContext,
};
pub use config::{ConfigError, RelyingPartyConfig};
pub use credentials::{Credentials, TokenResponse};
pub use error::{AuthenticationError, GrantError};
pub use grant::{Grant, GrantValues, ImplicitGrant, PkceGrant, ResponseType};
pub use pkce::{PkceChallenge, PkceChallengeGenerator, PkceError, PkceParameters, PkceVerifier};
pub use random::{generate_nonce, generate_state};
pub use transport::{HttpTokenExchange, TokenExchange, TokenExchangePayload};

/// Type alias for grant resolution results.
pub type AuthResult<T> = Result<T, GrantError>;

/// Prelude module for convenient imports.
///
/// ```
/// use oidc_rp::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::authorize::AuthorizeRequest;
    pub use crate::callback::values_from_redirect;
    pub use crate::claims::{
        ClaimError, ClaimsValidationPipeline, DecodedToken, IdTokenDecoder, JwtIdTokenDecoder,
        ValidationContext,
    };
    pub use crate::config::RelyingPartyConfig;
    pub use crate::credentials::Credentials;
    pub use crate::error::{AuthenticationError, GrantError};
    pub use crate::grant::{Grant, GrantValues, ImplicitGrant, PkceGrant, ResponseType};
    pub use crate::pkce::{PkceChallengeGenerator, PkceParameters};
    pub use crate::transport::{HttpTokenExchange, TokenExchange};
}
