//! Credentials produced by a successful grant.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Successful token endpoint response, as sent on the wire.
///
/// # Example Response
///
/// ```json
/// {
///   "access_token": "eyJhbG...",
///   "token_type": "Bearer",
///   "expires_in": 86400,
///   "scope": "openid profile email",
///   "id_token": "eyJhbG...",
///   "refresh_token": "v1.MjQ..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The access token.
    pub access_token: String,

    /// The token type (usually "Bearer").
    pub token_type: String,

    /// Access token lifetime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,

    /// Refresh token, if `offline_access` was granted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// ID token, if `openid` was granted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// Granted scopes (space-separated).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Tokens handed to the caller after grant resolution.
///
/// Never partially populated on failure: a grant either returns a complete
/// `Credentials` or an error. `access_token` is `None` only for implicit
/// logins that requested nothing but an ID token.
#[derive(Clone, PartialEq, Eq, Default, Serialize)]
pub struct Credentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    expires_at: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
}

impl Credentials {
    /// Creates credentials around an access token.
    #[must_use]
    pub fn new(access_token: impl Into<String>, token_type: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            token_type: Some(token_type.into()),
            ..Self::default()
        }
    }

    /// Creates credentials carrying only an ID token.
    #[must_use]
    pub fn id_token_only(id_token: impl Into<String>) -> Self {
        Self {
            id_token: Some(id_token.into()),
            ..Self::default()
        }
    }

    /// Converts a token endpoint response received at `received_at`.
    #[must_use]
    pub fn from_token_response(response: TokenResponse, received_at: OffsetDateTime) -> Self {
        let mut credentials = Self::new(response.access_token, response.token_type);
        credentials.id_token = response.id_token;
        credentials.refresh_token = response.refresh_token;
        credentials.scope = response.scope;
        if let Some(secs) = response.expires_in {
            credentials = credentials.with_expires_in(Duration::from_secs(secs), received_at);
        }
        credentials
    }

    /// Sets the ID token.
    #[must_use]
    pub fn with_id_token(mut self, id_token: impl Into<String>) -> Self {
        self.id_token = Some(id_token.into());
        self
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Sets the granted scope.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Sets the expiry to `received_at + expires_in`.
    #[must_use]
    pub fn with_expires_in(mut self, expires_in: Duration, received_at: OffsetDateTime) -> Self {
        self.expires_at = received_at.checked_add(time::Duration::seconds(
            i64::try_from(expires_in.as_secs()).unwrap_or(i64::MAX),
        ));
        self
    }

    /// The access token.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// The token type, e.g. "Bearer".
    #[must_use]
    pub fn token_type(&self) -> Option<&str> {
        self.token_type.as_deref()
    }

    /// The raw ID token.
    #[must_use]
    pub fn id_token(&self) -> Option<&str> {
        self.id_token.as_deref()
    }

    /// The refresh token.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// When the access token expires.
    #[must_use]
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        self.expires_at
    }

    /// The granted scope.
    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Returns `true` if the access token has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &self.access_token.as_ref().map(|_| ".."))
            .field("token_type", &self.token_type)
            .field("id_token", &self.id_token.as_ref().map(|_| ".."))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| ".."))
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .finish()
    }
}
