//! Token endpoint transport.
//!
//! [`PkceGrant`](crate::grant::PkceGrant) depends only on the narrow
//! [`TokenExchange`] capability so its logic can be exercised with a fake.
//! [`HttpTokenExchange`] is the production implementation: a form POST to the
//! provider's token endpoint. Timeouts and retries belong here, never to the
//! grant.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use time::OffsetDateTime;
use url::Url;

use crate::credentials::{Credentials, TokenResponse};
use crate::error::AuthenticationError;

/// Form parameters sent to the token endpoint.
pub type TokenExchangePayload = BTreeMap<String, String>;

/// Exchanges a grant payload for credentials at the token endpoint.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// Performs one exchange. Implementations own timeout and retry policy.
    async fn exchange(
        &self,
        payload: &TokenExchangePayload,
    ) -> Result<Credentials, AuthenticationError>;
}

/// OAuth error response body.
#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: String,
    error_description: Option<String>,
}

/// [`TokenExchange`] over HTTPS using `reqwest`.
///
/// Adds `client_id` to every payload, as required for public clients.
#[derive(Debug, Clone)]
pub struct HttpTokenExchange {
    http_client: reqwest::Client,
    token_endpoint: Url,
    client_id: String,
}

impl HttpTokenExchange {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Creates a transport for `token_endpoint` with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(
        token_endpoint: Url,
        client_id: impl Into<String>,
    ) -> Result<Self, AuthenticationError> {
        Self::with_timeout(token_endpoint, client_id, Self::DEFAULT_TIMEOUT)
    }

    /// Creates a transport with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_timeout(
        token_endpoint: Url,
        client_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AuthenticationError> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http_client, token_endpoint, client_id))
    }

    /// Creates a transport around an existing client.
    #[must_use]
    pub fn with_client(
        http_client: reqwest::Client,
        token_endpoint: Url,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            token_endpoint,
            client_id: client_id.into(),
        }
    }

    /// The token endpoint URL.
    #[must_use]
    pub fn token_endpoint(&self) -> &Url {
        &self.token_endpoint
    }
}

#[async_trait]
impl TokenExchange for HttpTokenExchange {
    async fn exchange(
        &self,
        payload: &TokenExchangePayload,
    ) -> Result<Credentials, AuthenticationError> {
        let mut form: Vec<(&str, &str)> = payload
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        form.push(("client_id", self.client_id.as_str()));

        tracing::debug!(
            token_endpoint = %self.token_endpoint,
            grant_type = payload.get("grant_type").map(String::as_str).unwrap_or_default(),
            "Exchanging grant at token endpoint"
        );

        let response = self
            .http_client
            .post(self.token_endpoint.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "Token endpoint rejected exchange");
            if let Ok(oauth_error) = serde_json::from_str::<OAuthErrorResponse>(&body) {
                return Err(AuthenticationError::oauth(
                    status.as_u16(),
                    oauth_error.error,
                    oauth_error.error_description.unwrap_or_default(),
                ));
            }
            return Err(AuthenticationError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let token_response: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            AuthenticationError::invalid_response(format!("Failed to parse token response: {e}"))
        })?;

        Ok(Credentials::from_token_response(
            token_response,
            OffsetDateTime::now_utc(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payload() -> TokenExchangePayload {
        [
            ("code", "auth-code"),
            ("code_verifier", "verifier"),
            ("grant_type", "authorization_code"),
            ("redirect_uri", "https://app.example.com/callback"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    async fn transport(server: &MockServer) -> HttpTokenExchange {
        let endpoint = Url::parse(&format!("{}/oauth/token", server.uri())).unwrap();
        HttpTokenExchange::new(endpoint, "client-id").unwrap()
    }

    #[tokio::test]
    async fn test_successful_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code_verifier=verifier"))
            .and(body_string_contains("client_id=client-id"))
            .and(body_string_contains(
                "redirect_uri=https%3A%2F%2Fapp.example.com%2Fcallback",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "at",
                "token_type": "Bearer",
                "expires_in": 86400,
                "id_token": "it"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let credentials = transport(&server).await.exchange(&payload()).await.unwrap();

        assert_eq!(credentials.access_token(), Some("at"));
        assert_eq!(credentials.id_token(), Some("it"));
        assert!(credentials.expires_at().is_some());
    }

    #[tokio::test]
    async fn test_oauth_error_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid authorization code"
            })))
            .mount(&server)
            .await;

        let err = transport(&server)
            .await
            .exchange(&payload())
            .await
            .unwrap_err();

        match err {
            AuthenticationError::OAuth {
                status,
                error,
                description,
            } => {
                assert_eq!(status, 403);
                assert_eq!(error, "invalid_grant");
                assert_eq!(description, "Invalid authorization code");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_plain_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = transport(&server)
            .await
            .exchange(&payload())
            .await
            .unwrap_err();

        assert!(matches!(err, AuthenticationError::Http { status: 502, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"token_type\":"))
            .mount(&server)
            .await;

        let err = transport(&server)
            .await
            .exchange(&payload())
            .await
            .unwrap_err();

        assert!(matches!(err, AuthenticationError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_network_error() {
        // Port 1 (tcpmux) is not served on test hosts.
        let endpoint = Url::parse("http://127.0.0.1:1/oauth/token").unwrap();
        let transport = HttpTokenExchange::with_timeout(endpoint, "client-id", Duration::from_secs(2))
            .unwrap();

        let err = transport.exchange(&payload()).await.unwrap_err();
        assert!(matches!(err, AuthenticationError::Network { .. }));
    }
}
