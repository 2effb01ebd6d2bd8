//! Per-login validation settings.

use std::time::Duration;

use time::OffsetDateTime;

/// Default clock skew tolerance applied to time-based claims.
pub const DEFAULT_LEEWAY: Duration = Duration::from_secs(60);

/// Settings captured when a login attempt starts.
///
/// One context is built per authorization request and is immutable from then
/// on; validators copy what they need out of it at construction.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use oidc_rp::claims::ValidationContext;
///
/// let context = ValidationContext::new("https://auth.example.com/", "client-id")
///     .with_nonce("n-0S6_WzA2Mj")
///     .with_max_age(Duration::from_secs(3600));
///
/// assert_eq!(context.leeway(), Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationContext {
    issuer: String,
    audience: String,
    leeway: Duration,
    max_age: Option<Duration>,
    nonce: Option<String>,
    organization: Option<String>,
    base_time: OffsetDateTime,
}

impl ValidationContext {
    /// Creates a context for the given issuer and client id, anchored at the
    /// current time with the default leeway.
    #[must_use]
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            leeway: DEFAULT_LEEWAY,
            max_age: None,
            nonce: None,
            organization: None,
            base_time: OffsetDateTime::now_utc(),
        }
    }

    /// Sets the clock skew tolerance.
    #[must_use]
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    /// Sets the max age requested with the authorization request.
    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Sets the nonce sent with the authorization request.
    #[must_use]
    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Sets the organization requested for the login.
    #[must_use]
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Sets the reference ("now") time.
    #[must_use]
    pub fn with_base_time(mut self, base_time: OffsetDateTime) -> Self {
        self.base_time = base_time;
        self
    }

    /// Expected issuer URL.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Expected audience, i.e. the client id.
    #[must_use]
    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Clock skew tolerance.
    #[must_use]
    pub fn leeway(&self) -> Duration {
        self.leeway
    }

    /// Requested max age, if any.
    #[must_use]
    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    /// Expected nonce, if one was sent.
    #[must_use]
    pub fn nonce(&self) -> Option<&str> {
        self.nonce.as_deref()
    }

    /// Requested organization, if any.
    #[must_use]
    pub fn organization(&self) -> Option<&str> {
        self.organization.as_deref()
    }

    /// Reference time.
    #[must_use]
    pub fn base_time(&self) -> OffsetDateTime {
        self.base_time
    }
}
