//! Decoded ID token claims.
//!
//! A [`DecodedToken`] is produced once per token by an [`IdTokenDecoder`]
//! after the signature has been verified. It is never mutated afterwards;
//! validators only read it.
//!
//! Claims with an unexpected JSON type are treated as absent, so a numeric
//! `iss` surfaces as "missing issuer" rather than as a decoding failure.
//!
//! [`IdTokenDecoder`]: super::decoder::IdTokenDecoder

use serde::Deserialize;
use serde_json::{Map, Value};
use time::OffsetDateTime;

use super::epoch;

/// Typed, read-only view over verified ID token claims.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct DecodedToken {
    issuer: Option<String>,
    subject: Option<String>,
    audience: Option<Vec<String>>,
    expires_at: Option<OffsetDateTime>,
    issued_at: Option<OffsetDateTime>,
    nonce: Option<String>,
    authorized_party: Option<String>,
    auth_time: Option<OffsetDateTime>,
    organization_id: Option<String>,
    claims: Map<String, Value>,
}

impl DecodedToken {
    /// Creates an empty token; populate it with the `with_*` methods.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a token view from a JSON claims object.
    #[must_use]
    pub fn from_claims(claims: Map<String, Value>) -> Self {
        Self {
            issuer: string_claim(&claims, "iss"),
            subject: string_claim(&claims, "sub"),
            audience: audience_claim(&claims),
            expires_at: time_claim(&claims, "exp"),
            issued_at: time_claim(&claims, "iat"),
            nonce: string_claim(&claims, "nonce"),
            authorized_party: string_claim(&claims, "azp"),
            auth_time: time_claim(&claims, "auth_time"),
            organization_id: string_claim(&claims, "org_id"),
            claims,
        }
    }

    /// Issuer (`iss`).
    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    /// Subject (`sub`).
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Audience (`aud`), normalized to a list. An empty list is reported as absent.
    #[must_use]
    pub fn audience(&self) -> Option<&[String]> {
        self.audience.as_deref()
    }

    /// Expiration time (`exp`).
    #[must_use]
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        self.expires_at
    }

    /// Issued-at time (`iat`).
    #[must_use]
    pub fn issued_at(&self) -> Option<OffsetDateTime> {
        self.issued_at
    }

    /// Nonce (`nonce`).
    #[must_use]
    pub fn nonce(&self) -> Option<&str> {
        self.nonce.as_deref()
    }

    /// Authorized party (`azp`).
    #[must_use]
    pub fn authorized_party(&self) -> Option<&str> {
        self.authorized_party.as_deref()
    }

    /// Time of the end-user authentication (`auth_time`).
    #[must_use]
    pub fn auth_time(&self) -> Option<OffsetDateTime> {
        self.auth_time
    }

    /// Organization id (`org_id`).
    #[must_use]
    pub fn organization_id(&self) -> Option<&str> {
        self.organization_id.as_deref()
    }

    /// Raw value of any claim, including ones without a typed accessor.
    #[must_use]
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Sets the issuer.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Sets the subject.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the audience.
    #[must_use]
    pub fn with_audience<I, S>(mut self, audience: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let audience: Vec<String> = audience.into_iter().map(Into::into).collect();
        self.audience = (!audience.is_empty()).then_some(audience);
        self
    }

    /// Sets the expiration time.
    #[must_use]
    pub fn with_expires_at(mut self, expires_at: OffsetDateTime) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Sets the issued-at time.
    #[must_use]
    pub fn with_issued_at(mut self, issued_at: OffsetDateTime) -> Self {
        self.issued_at = Some(issued_at);
        self
    }

    /// Sets the nonce.
    #[must_use]
    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Sets the authorized party.
    #[must_use]
    pub fn with_authorized_party(mut self, azp: impl Into<String>) -> Self {
        self.authorized_party = Some(azp.into());
        self
    }

    /// Sets the authentication time.
    #[must_use]
    pub fn with_auth_time(mut self, auth_time: OffsetDateTime) -> Self {
        self.auth_time = Some(auth_time);
        self
    }

    /// Sets the organization id.
    #[must_use]
    pub fn with_organization_id(mut self, org_id: impl Into<String>) -> Self {
        self.organization_id = Some(org_id.into());
        self
    }
}

impl From<Map<String, Value>> for DecodedToken {
    fn from(claims: Map<String, Value>) -> Self {
        Self::from_claims(claims)
    }
}

fn string_claim(claims: &Map<String, Value>, name: &str) -> Option<String> {
    claims.get(name).and_then(Value::as_str).map(String::from)
}

/// NumericDate claims may be integers or fractional seconds. Values past the
/// representable range are clamped so the claim still counts as present.
fn time_claim(claims: &Map<String, Value>, name: &str) -> Option<OffsetDateTime> {
    claims
        .get(name)
        .and_then(Value::as_f64)
        .map(epoch::saturating_from_seconds)
}

/// `aud` may be a single string or an array of strings.
fn audience_claim(claims: &Map<String, Value>) -> Option<Vec<String>> {
    let audience: Vec<String> = match claims.get("aud")? {
        Value::String(single) => vec![single.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect(),
        _ => return None,
    };
    (!audience.is_empty()).then_some(audience)
}
