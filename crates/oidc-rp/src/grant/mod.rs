//! OAuth 2.0 grant resolution.
//!
//! A grant turns whatever the provider sent back to the redirect URI into
//! [`Credentials`]. Both grants implement [`Grant`], so callers can drive a
//! login without knowing which flow is in use:
//!
//! - [`ImplicitGrant`] - tokens arrive in the redirect fragment; the ID token
//!   is decoded and validated locally.
//! - [`PkceGrant`] - an authorization code arrives and is exchanged, together
//!   with the PKCE verifier, at the token endpoint.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;

use crate::credentials::Credentials;
use crate::error::GrantError;

pub mod implicit;
pub mod pkce;

pub use implicit::{ImplicitGrant, ResponseType};
pub use pkce::PkceGrant;

/// Values returned by the provider, keyed by parameter name.
pub type GrantValues = HashMap<String, String>;

/// Common contract of all grants.
#[async_trait]
pub trait Grant: Send + Sync {
    /// Parameters this grant adds to the authorization request.
    fn authorize_parameters(&self) -> BTreeMap<String, String>;

    /// Resolves credentials from the values returned to the redirect URI.
    ///
    /// Never returns partially populated credentials: any missing or invalid
    /// component fails the whole resolution.
    async fn resolve_credentials(&self, values: &GrantValues) -> Result<Credentials, GrantError>;
}

/// Fails with [`GrantError::Provider`] if the provider redirected back with
/// an OAuth `error`.
pub(crate) fn ensure_no_provider_error(values: &GrantValues) -> Result<(), GrantError> {
    match values.get("error") {
        Some(error) => {
            let description = values
                .get("error_description")
                .cloned()
                .unwrap_or_default();
            tracing::debug!(error = %error, "Provider returned an authorization error");
            Err(GrantError::provider(error.clone(), description))
        }
        None => Ok(()),
    }
}

/// Looks up a required value, failing with `MissingCredentials`.
pub(crate) fn require<'a>(values: &'a GrantValues, field: &str) -> Result<&'a str, GrantError> {
    values
        .get(field)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| GrantError::missing_credentials(field))
}
