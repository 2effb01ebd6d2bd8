//! Implicit grant.
//!
//! Tokens arrive directly in the redirect fragment. There is no token
//! endpoint call; an ID token, when requested, is decoded and run through the
//! canonical claims pipeline before any credentials are returned.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;

use super::{Grant, GrantValues, ensure_no_provider_error, require};
use crate::claims::{ClaimsValidationPipeline, IdTokenDecoder, ValidationContext};
use crate::credentials::Credentials;
use crate::error::GrantError;

/// A response component requested from the authorization endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResponseType {
    /// An access token (`token`).
    Token,
    /// An ID token (`id_token`).
    IdToken,
}

impl ResponseType {
    /// The `response_type` value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::IdToken => "id_token",
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a requested ID token is checked.
struct IdTokenVerification {
    context: ValidationContext,
    decoder: Arc<dyn IdTokenDecoder>,
}

/// Resolves credentials from an implicit-flow redirect.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use oidc_rp::grant::{ImplicitGrant, ResponseType};
///
/// let grant = ImplicitGrant::new([ResponseType::Token]);
/// let values = HashMap::from([
///     ("access_token".to_string(), "T".to_string()),
///     ("token_type".to_string(), "bearer".to_string()),
/// ]);
///
/// let credentials = grant.resolve(&values).unwrap();
/// assert_eq!(credentials.access_token(), Some("T"));
/// ```
pub struct ImplicitGrant {
    response_types: BTreeSet<ResponseType>,
    verification: Option<IdTokenVerification>,
}

impl ImplicitGrant {
    /// Creates a grant expecting the given response components.
    ///
    /// Requesting [`ResponseType::IdToken`] also requires
    /// [`with_id_token_verification`](Self::with_id_token_verification).
    #[must_use]
    pub fn new(response_types: impl IntoIterator<Item = ResponseType>) -> Self {
        Self {
            response_types: response_types.into_iter().collect(),
            verification: None,
        }
    }

    /// Sets how the ID token is verified.
    ///
    /// `context` must carry the nonce sent with the authorization request.
    #[must_use]
    pub fn with_id_token_verification(
        mut self,
        context: ValidationContext,
        decoder: Arc<dyn IdTokenDecoder>,
    ) -> Self {
        self.verification = Some(IdTokenVerification { context, decoder });
        self
    }

    /// Returns `true` if `response_type` was requested.
    #[must_use]
    pub fn requests(&self, response_type: ResponseType) -> bool {
        self.response_types.contains(&response_type)
    }

    /// The space-separated `response_type` parameter, e.g. `"token id_token"`.
    #[must_use]
    pub fn response_type(&self) -> String {
        self.response_types
            .iter()
            .map(ResponseType::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The nonce the ID token must echo, if one was configured.
    #[must_use]
    pub fn nonce(&self) -> Option<&str> {
        self.verification
            .as_ref()
            .and_then(|verification| verification.context.nonce())
    }

    /// Resolves credentials from the redirect `values`.
    ///
    /// Performs no I/O.
    ///
    /// # Errors
    ///
    /// - `Provider` if the redirect carries an OAuth `error`
    /// - `MissingCredentials` if a requested component is absent
    /// - `IdTokenDecode` or `ClaimValidation` if the ID token is rejected
    /// - `Configuration` if an ID token is requested without a verifier or nonce
    pub fn resolve(&self, values: &GrantValues) -> Result<Credentials, GrantError> {
        ensure_no_provider_error(values)?;

        if self.response_types.is_empty() {
            return Err(GrantError::configuration(
                "implicit grant requests no response type",
            ));
        }

        let id_token = if self.requests(ResponseType::IdToken) {
            Some(self.verify_id_token(values)?)
        } else {
            None
        };

        let credentials = if self.requests(ResponseType::Token) {
            let credentials = access_token_credentials(values, OffsetDateTime::now_utc())?;
            match id_token {
                Some(id_token) => credentials.with_id_token(id_token),
                None => credentials,
            }
        } else {
            match id_token {
                Some(id_token) => Credentials::id_token_only(id_token),
                None => return Err(GrantError::missing_credentials("id_token")),
            }
        };

        tracing::debug!(
            response_type = %self.response_type(),
            "Implicit grant resolved credentials"
        );
        Ok(credentials)
    }

    fn verify_id_token(&self, values: &GrantValues) -> Result<String, GrantError> {
        let id_token = require(values, "id_token")?;

        let verification = self.verification.as_ref().ok_or_else(|| {
            GrantError::configuration("id_token requested without a token decoder")
        })?;
        if verification.context.nonce().is_none() {
            return Err(GrantError::configuration(
                "id_token requested without a nonce",
            ));
        }

        let token = verification.decoder.decode(id_token)?;
        ClaimsValidationPipeline::from_context(&verification.context).validate(&token)?;

        Ok(id_token.to_string())
    }
}

/// Builds credentials from the access token fields of the fragment.
fn access_token_credentials(
    values: &GrantValues,
    received_at: OffsetDateTime,
) -> Result<Credentials, GrantError> {
    let access_token = require(values, "access_token")?;
    let token_type = require(values, "token_type")?;

    let mut credentials = Credentials::new(access_token, token_type);

    if let Some(expires_in) = values.get("expires_in") {
        match expires_in.parse::<u64>() {
            Ok(secs) => {
                credentials =
                    credentials.with_expires_in(Duration::from_secs(secs), received_at);
            }
            Err(_) => {
                tracing::warn!(expires_in = %expires_in, "Ignoring malformed expires_in");
            }
        }
    }
    if let Some(refresh_token) = values.get("refresh_token") {
        credentials = credentials.with_refresh_token(refresh_token.as_str());
    }
    if let Some(scope) = values.get("scope") {
        credentials = credentials.with_scope(scope.as_str());
    }

    Ok(credentials)
}

impl fmt::Debug for ImplicitGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImplicitGrant")
            .field("response_types", &self.response_types)
            .field(
                "context",
                &self.verification.as_ref().map(|v| &v.context),
            )
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Grant for ImplicitGrant {
    fn authorize_parameters(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("response_type".to_string(), self.response_type());
        if self.requests(ResponseType::IdToken)
            && let Some(nonce) = self.nonce()
        {
            params.insert("nonce".to_string(), nonce.to_string());
        }
        params
    }

    async fn resolve_credentials(&self, values: &GrantValues) -> Result<Credentials, GrantError> {
        self.resolve(values)
    }
}
