//! End-to-end implicit flow: authorize URL, redirect fragment, signed ID token.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, encode};
use oidc_rp::prelude::*;
use oidc_rp::{ClaimError, DecodeError, generate_nonce};
use serde_json::{Value, json};
use time::OffsetDateTime;
use url::Url;

const SECRET: &[u8] = b"integration-test-hs256-signing-secret";
const ISSUER: &str = "https://auth.example.com/";
const CLIENT_ID: &str = "spa-client";

fn config() -> RelyingPartyConfig {
    RelyingPartyConfig::from_toml_str(&format!(
        r#"
        issuer = "{ISSUER}"
        client_id = "{CLIENT_ID}"
        redirect_uri = "https://app.example.com/callback"
        max_age = "1h"
        "#
    ))
    .unwrap()
}

fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

fn sign(claims: &Value) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(SECRET),
    )
    .unwrap()
}

fn valid_claims(nonce: &str) -> Value {
    json!({
        "iss": ISSUER,
        "sub": "auth0|user-1",
        "aud": CLIENT_ID,
        "exp": now() + 600,
        "iat": now(),
        "nonce": nonce,
        "auth_time": now() - 60,
    })
}

fn grant(config: &RelyingPartyConfig, nonce: &str) -> ImplicitGrant {
    let decoder = JwtIdTokenDecoder::new(DecodingKey::from_secret(SECRET), Algorithm::HS256);
    ImplicitGrant::new([ResponseType::IdToken, ResponseType::Token]).with_id_token_verification(
        config.validation_context(Some(nonce), OffsetDateTime::now_utc()),
        Arc::new(decoder),
    )
}

fn redirect(fragment: &str) -> GrantValues {
    let url = Url::parse(&format!("https://app.example.com/callback#{fragment}")).unwrap();
    values_from_redirect(&url)
}

#[tokio::test]
async fn test_implicit_login() {
    let config = config();
    let nonce = generate_nonce();
    let grant = grant(&config, &nonce);

    let request = config.authorize_request().unwrap();
    let url = request.build(&grant);
    assert!(url.as_str().contains("response_type=token+id_token"));
    assert!(url.as_str().contains(&format!("nonce={nonce}")));

    let id_token = sign(&valid_claims(&nonce));
    let values = redirect(&format!(
        "access_token=T&token_type=bearer&expires_in=86400&id_token={id_token}&state={}",
        request.state()
    ));
    assert!(oidc_rp::callback::state_matches(&values, request.state()));

    let credentials = grant.resolve_credentials(&values).await.unwrap();

    assert_eq!(credentials.access_token(), Some("T"));
    assert_eq!(credentials.token_type(), Some("bearer"));
    assert_eq!(credentials.id_token(), Some(id_token.as_str()));
    assert!(!credentials.is_expired_at(OffsetDateTime::now_utc()));
}

#[tokio::test]
async fn test_replayed_nonce_rejected() {
    let config = config();
    let grant = grant(&config, "fresh-nonce");

    let id_token = sign(&valid_claims("stale-nonce"));
    let values = redirect(&format!(
        "access_token=T&token_type=bearer&id_token={id_token}"
    ));

    let err = grant.resolve_credentials(&values).await.unwrap_err();

    assert_eq!(
        err.claim_error(),
        Some(&ClaimError::mismatched_nonce("stale-nonce", "fresh-nonce"))
    );
}

#[tokio::test]
async fn test_expired_id_token_rejected() {
    let config = config();
    let grant = grant(&config, "n");

    let mut claims = valid_claims("n");
    claims["exp"] = json!(now() - 120);
    let values = redirect(&format!(
        "access_token=T&token_type=bearer&id_token={}",
        sign(&claims)
    ));

    let err = grant.resolve_credentials(&values).await.unwrap_err();
    assert!(err.claim_error().is_some_and(ClaimError::is_expired));
}

#[tokio::test]
async fn test_expiry_within_leeway_accepted() {
    let config = config();
    let grant = grant(&config, "n");

    let mut claims = valid_claims("n");
    claims["exp"] = json!(now() - 10);
    let values = redirect(&format!(
        "access_token=T&token_type=bearer&id_token={}",
        sign(&claims)
    ));

    assert!(grant.resolve_credentials(&values).await.is_ok());
}

#[tokio::test]
async fn test_stale_authentication_rejected() {
    let config = config();
    let grant = grant(&config, "n");

    let mut claims = valid_claims("n");
    claims["auth_time"] = json!(now() - 2 * 3600);
    let values = redirect(&format!(
        "access_token=T&token_type=bearer&id_token={}",
        sign(&claims)
    ));

    let err = grant.resolve_credentials(&values).await.unwrap_err();
    assert!(matches!(
        err.claim_error(),
        Some(ClaimError::PastLastAuth { .. })
    ));
}

#[tokio::test]
async fn test_multiple_audiences_require_azp() {
    let config = config();
    let grant = grant(&config, "n");

    let mut claims = valid_claims("n");
    claims["aud"] = json!([CLIENT_ID, "https://api.example.com/"]);
    let values = redirect(&format!("access_token=T&token_type=bearer&id_token={}", sign(&claims)));

    let err = grant.resolve_credentials(&values).await.unwrap_err();
    assert_eq!(err.claim_error(), Some(&ClaimError::MissingAzp));

    claims["azp"] = json!(CLIENT_ID);
    let values = redirect(&format!("access_token=T&token_type=bearer&id_token={}", sign(&claims)));
    assert!(grant.resolve_credentials(&values).await.is_ok());
}

#[tokio::test]
async fn test_forged_signature_rejected() {
    let config = config();
    let grant = grant(&config, "n");

    let forged = encode(
        &Header::new(Algorithm::HS256),
        &valid_claims("n"),
        &EncodingKey::from_secret(b"attacker-controlled-secret-value"),
    )
    .unwrap();
    let values = redirect(&format!("access_token=T&token_type=bearer&id_token={forged}"));

    let err = grant.resolve_credentials(&values).await.unwrap_err();
    assert!(matches!(
        err,
        GrantError::IdTokenDecode(DecodeError::InvalidSignature)
    ));
}

#[tokio::test]
async fn test_provider_error_redirect() {
    let config = config();
    let grant = grant(&config, "n");

    let values = redirect("error=login_required&error_description=Login+required");
    let err = grant.resolve_credentials(&values).await.unwrap_err();

    match err {
        GrantError::Provider { error, description } => {
            assert_eq!(error, "login_required");
            assert_eq!(description, "Login required");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_organization_login() {
    let mut config = config();
    config.organization = Some("org_123".to_string());
    config.max_age = None;
    let grant = grant(&config, "n");

    let values = redirect(&format!(
        "access_token=T&token_type=bearer&id_token={}",
        sign(&valid_claims("n"))
    ));
    let err = grant.resolve_credentials(&values).await.unwrap_err();
    assert_eq!(err.claim_error(), Some(&ClaimError::MissingOrgId));

    let mut claims = valid_claims("n");
    claims["org_id"] = json!("org_123");
    let values = redirect(&format!("access_token=T&token_type=bearer&id_token={}", sign(&claims)));
    let credentials = grant.resolve_credentials(&values).await.unwrap();
    assert_eq!(credentials.access_token(), Some("T"));
}
