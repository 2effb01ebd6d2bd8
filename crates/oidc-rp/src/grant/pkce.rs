//! Authorization code grant with PKCE.
//!
//! The redirect carries a `code`, which is exchanged at the token endpoint
//! together with the PKCE verifier. The exchange is a single call to the
//! injected [`TokenExchange`]; timeouts and retries are its concern.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use super::{Grant, GrantValues, ensure_no_provider_error, require};
use crate::credentials::Credentials;
use crate::error::GrantError;
use crate::pkce::{PkceChallengeGenerator, PkceParameters};
use crate::transport::{TokenExchange, TokenExchangePayload};

/// Resolves credentials by exchanging an authorization code.
///
/// An ID token returned by the exchange is passed through as-is; callers
/// that rely on it validate it with a
/// [`ClaimsValidationPipeline`](crate::claims::ClaimsValidationPipeline).
pub struct PkceGrant {
    transport: Arc<dyn TokenExchange>,
    redirect_uri: Url,
    pkce: PkceParameters,
}

impl PkceGrant {
    /// Creates a grant with existing PKCE parameters.
    #[must_use]
    pub fn new(transport: Arc<dyn TokenExchange>, redirect_uri: Url, pkce: PkceParameters) -> Self {
        Self {
            transport,
            redirect_uri,
            pkce,
        }
    }

    /// Creates a grant with freshly generated PKCE parameters.
    #[must_use]
    pub fn generate(transport: Arc<dyn TokenExchange>, redirect_uri: Url) -> Self {
        Self::new(
            transport,
            redirect_uri,
            PkceChallengeGenerator::new().generate(),
        )
    }

    /// The redirect URI registered for this login.
    #[must_use]
    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }

    /// The PKCE parameters for this login.
    #[must_use]
    pub fn pkce(&self) -> &PkceParameters {
        &self.pkce
    }

    /// Builds the token request for `code`.
    fn token_payload(&self, code: &str) -> TokenExchangePayload {
        TokenExchangePayload::from([
            ("code".to_string(), code.to_string()),
            (
                "code_verifier".to_string(),
                self.pkce.verifier().as_str().to_string(),
            ),
            ("grant_type".to_string(), "authorization_code".to_string()),
            ("redirect_uri".to_string(), self.redirect_uri.to_string()),
        ])
    }
}

impl fmt::Debug for PkceGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PkceGrant")
            .field("redirect_uri", &self.redirect_uri.as_str())
            .field("pkce", &self.pkce)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Grant for PkceGrant {
    fn authorize_parameters(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("response_type".to_string(), "code".to_string()),
            (
                "code_challenge".to_string(),
                self.pkce.challenge().as_str().to_string(),
            ),
            (
                "code_challenge_method".to_string(),
                self.pkce.method().as_str().to_string(),
            ),
            ("redirect_uri".to_string(), self.redirect_uri.to_string()),
        ])
    }

    async fn resolve_credentials(&self, values: &GrantValues) -> Result<Credentials, GrantError> {
        ensure_no_provider_error(values)?;
        let code = require(values, "code")?;

        let credentials = self
            .transport
            .exchange(&self.token_payload(code))
            .await
            .map_err(GrantError::Transport)?;

        tracing::debug!(
            redirect_uri = %self.redirect_uri,
            has_id_token = credentials.id_token().is_some(),
            "Authorization code exchanged"
        );
        Ok(credentials)
    }
}
