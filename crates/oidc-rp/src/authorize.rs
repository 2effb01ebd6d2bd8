//! Authorization request URLs.
//!
//! An [`AuthorizeRequest`] carries the client-level parameters of a login
//! (client id, redirect URI, scope, state) and combines them with whatever a
//! [`Grant`] contributes (`response_type`, `nonce`, PKCE challenge).
//!
//! ```
//! use oidc_rp::authorize::AuthorizeRequest;
//! use oidc_rp::grant::{ImplicitGrant, ResponseType};
//! use url::Url;
//!
//! let request = AuthorizeRequest::new(
//!     Url::parse("https://auth.example.com/authorize").unwrap(),
//!     "client-id",
//!     Url::parse("https://app.example.com/callback").unwrap(),
//! )
//! .with_state("af0ifjsldkj");
//!
//! let url = request.build(&ImplicitGrant::new([ResponseType::Token]));
//! assert!(url.as_str().contains("response_type=token"));
//! assert!(url.as_str().contains("state=af0ifjsldkj"));
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use url::Url;

use crate::grant::Grant;
use crate::random::generate_state;

/// Scope requested when none is configured.
pub const DEFAULT_SCOPE: &str = "openid profile email";

/// Builder for the provider authorization URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeRequest {
    authorization_endpoint: Url,
    client_id: String,
    redirect_uri: Url,
    scope: String,
    state: String,
    max_age: Option<Duration>,
    organization: Option<String>,
    extra_params: BTreeMap<String, String>,
}

impl AuthorizeRequest {
    /// Creates a request with the default scope and a fresh random state.
    #[must_use]
    pub fn new(authorization_endpoint: Url, client_id: impl Into<String>, redirect_uri: Url) -> Self {
        Self {
            authorization_endpoint,
            client_id: client_id.into(),
            redirect_uri,
            scope: DEFAULT_SCOPE.to_string(),
            state: generate_state(),
            max_age: None,
            organization: None,
            extra_params: BTreeMap::new(),
        }
    }

    /// Sets the requested scope (space-separated).
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Replaces the generated state.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    /// Requests re-authentication after `max_age`.
    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Requests login into `organization`.
    #[must_use]
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Adds a provider-specific parameter, e.g. `prompt` or `audience`.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_params.insert(key.into(), value.into());
        self
    }

    /// The state value; compare it with the one returned to the redirect URI.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Builds the URL to send the user agent to.
    ///
    /// Grant parameters take precedence over client-level ones.
    #[must_use]
    pub fn build(&self, grant: &dyn Grant) -> Url {
        let mut params = BTreeMap::new();
        params.insert("client_id".to_string(), self.client_id.clone());
        params.insert("redirect_uri".to_string(), self.redirect_uri.to_string());
        params.insert("scope".to_string(), self.scope.clone());
        params.insert("state".to_string(), self.state.clone());
        if let Some(max_age) = self.max_age {
            params.insert("max_age".to_string(), whole_seconds(max_age).to_string());
        }
        if let Some(organization) = &self.organization {
            params.insert("organization".to_string(), organization.clone());
        }
        params.extend(self.extra_params.clone());
        params.extend(grant.authorize_parameters());

        let mut url = self.authorization_endpoint.clone();
        url.query_pairs_mut().extend_pairs(&params);

        tracing::debug!(
            authorization_endpoint = %self.authorization_endpoint,
            response_type = params.get("response_type").map(String::as_str).unwrap_or_default(),
            "Built authorization URL"
        );
        url
    }
}

/// `max_age` is sent in whole seconds; a fractional part rounds up.
fn whole_seconds(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() != 0)
}
