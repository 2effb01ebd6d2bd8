//! Relying party configuration.
//!
//! Everything needed to start a login and validate its ID token, loaded from
//! TOML.
//!
//! # Example (TOML)
//!
//! ```toml
//! issuer = "https://auth.example.com/"
//! client_id = "my-client"
//! redirect_uri = "https://app.example.com/callback"
//! leeway = "60s"
//! max_age = "1h"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;

use crate::authorize::{AuthorizeRequest, DEFAULT_SCOPE};
use crate::claims::{DEFAULT_LEEWAY, ValidationContext};
use crate::transport::HttpTokenExchange;

/// Default timeout for token endpoint requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration of one relying party (OAuth client).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RelyingPartyConfig {
    /// Expected `iss` of ID tokens, e.g. `https://auth.example.com/`.
    pub issuer: String,

    /// OAuth client id; the expected `aud` and `azp`.
    pub client_id: String,

    /// Redirect URI registered with the provider.
    pub redirect_uri: String,

    /// Authorization endpoint. Defaults to `{issuer}/authorize`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_endpoint: Option<String>,

    /// Token endpoint. Defaults to `{issuer}/oauth/token`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_endpoint: Option<String>,

    /// Requested scope (space-separated).
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Clock skew tolerated for `exp` and `auth_time`.
    #[serde(default = "default_leeway", with = "humantime_serde")]
    pub leeway: Duration,

    /// Maximum age of the end-user authentication.
    /// When set, ID tokens must carry `auth_time`.
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub max_age: Option<Duration>,

    /// Organization the user must log into (`org_id` claim).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    /// Timeout for token endpoint requests.
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

fn default_leeway() -> Duration {
    DEFAULT_LEEWAY
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid TOML or has the wrong shape.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl RelyingPartyConfig {
    /// Creates a configuration with defaults for everything but the
    /// required fields.
    #[must_use]
    pub fn new(
        issuer: impl Into<String>,
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            authorization_endpoint: None,
            token_endpoint: None,
            scope: default_scope(),
            leeway: DEFAULT_LEEWAY,
            max_age: None,
            organization: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML and
    /// `ConfigError::InvalidValue` if validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::Parse(format!("TOML parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "Loaded relying party configuration");
        Self::from_toml_str(&content)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The issuer or client id is empty
    /// - Any configured URL does not parse
    /// - The scope does not include `openid`
    /// - `max_age` has a sub-second part
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issuer.is_empty() {
            return Err(ConfigError::InvalidValue(
                "issuer cannot be empty".to_string(),
            ));
        }

        if self.client_id.is_empty() {
            return Err(ConfigError::InvalidValue(
                "client_id cannot be empty".to_string(),
            ));
        }

        self.issuer_url()?;
        self.redirect_uri_url()?;
        self.authorization_endpoint_url()?;
        self.token_endpoint_url()?;

        if !self.scope.split_whitespace().any(|scope| scope == "openid") {
            return Err(ConfigError::InvalidValue(format!(
                "scope '{}' must include 'openid'",
                self.scope
            )));
        }

        if let Some(max_age) = self.max_age
            && max_age.subsec_nanos() != 0
        {
            return Err(ConfigError::InvalidValue(format!(
                "max_age {max_age:?} must be a whole number of seconds"
            )));
        }

        Ok(())
    }

    /// The issuer as a URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the issuer is not a URL.
    pub fn issuer_url(&self) -> Result<Url, ConfigError> {
        parse_url("issuer", &self.issuer)
    }

    /// The redirect URI as a URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the redirect URI is not a URL.
    pub fn redirect_uri_url(&self) -> Result<Url, ConfigError> {
        parse_url("redirect_uri", &self.redirect_uri)
    }

    /// The configured authorization endpoint, or `{issuer}/authorize`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the endpoint is not a URL.
    pub fn authorization_endpoint_url(&self) -> Result<Url, ConfigError> {
        match &self.authorization_endpoint {
            Some(endpoint) => parse_url("authorization_endpoint", endpoint),
            None => self.issuer_endpoint("authorize"),
        }
    }

    /// The configured token endpoint, or `{issuer}/oauth/token`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the endpoint is not a URL.
    pub fn token_endpoint_url(&self) -> Result<Url, ConfigError> {
        match &self.token_endpoint {
            Some(endpoint) => parse_url("token_endpoint", endpoint),
            None => self.issuer_endpoint("oauth/token"),
        }
    }

    /// Builds the claims validation context for one login attempt.
    #[must_use]
    pub fn validation_context(
        &self,
        nonce: Option<&str>,
        base_time: OffsetDateTime,
    ) -> ValidationContext {
        let mut context = ValidationContext::new(&self.issuer, &self.client_id)
            .with_leeway(self.leeway)
            .with_base_time(base_time);
        if let Some(nonce) = nonce {
            context = context.with_nonce(nonce);
        }
        if let Some(max_age) = self.max_age {
            context = context.with_max_age(max_age);
        }
        if let Some(organization) = &self.organization {
            context = context.with_organization(organization.as_str());
        }
        context
    }

    /// Starts an authorization request with this client's parameters.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if an endpoint is not a URL.
    pub fn authorize_request(&self) -> Result<AuthorizeRequest, ConfigError> {
        let mut request = AuthorizeRequest::new(
            self.authorization_endpoint_url()?,
            &self.client_id,
            self.redirect_uri_url()?,
        )
        .with_scope(&self.scope);
        if let Some(max_age) = self.max_age {
            request = request.with_max_age(max_age);
        }
        if let Some(organization) = &self.organization {
            request = request.with_organization(organization.as_str());
        }
        Ok(request)
    }

    /// Creates the HTTP token endpoint transport for this client.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the token endpoint is not a URL
    /// or the HTTP client cannot be built.
    pub fn token_exchange(&self) -> Result<HttpTokenExchange, ConfigError> {
        HttpTokenExchange::with_timeout(
            self.token_endpoint_url()?,
            &self.client_id,
            self.request_timeout,
        )
        .map_err(|e| ConfigError::InvalidValue(format!("cannot build HTTP client: {e}")))
    }

    fn issuer_endpoint(&self, path: &str) -> Result<Url, ConfigError> {
        let mut base = self.issuer_url()?;
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path)
            .map_err(|e| ConfigError::InvalidValue(format!("cannot derive {path} endpoint: {e}")))
    }
}

fn parse_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value)
        .map_err(|e| ConfigError::InvalidValue(format!("{field} '{value}' is not a valid URL: {e}")))
}
