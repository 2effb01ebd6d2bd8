use std::sync::Arc;

use anyhow::Result;
use oidc_rp::{Grant, ImplicitGrant, PkceGrant, RelyingPartyConfig, ResponseType, generate_nonce};
use serde::Serialize;

use crate::cli::{AuthorizeUrlArgs, Flow};
use crate::commands::load_config;
use crate::output::print_json;

/// What the operator needs to finish the login later.
#[derive(Debug, Serialize)]
pub struct AuthorizeOutput {
    pub url: String,
    pub state: String,
    pub nonce: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_verifier: Option<String>,
}

pub fn authorize_url(args: &AuthorizeUrlArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let output = build(&config, args.flow, args.state.as_deref())?;
    print_json(&output)
}

pub fn build(
    config: &RelyingPartyConfig,
    flow: Flow,
    state: Option<&str>,
) -> Result<AuthorizeOutput> {
    let nonce = generate_nonce();
    let mut request = config.authorize_request()?.with_param("nonce", &nonce);
    if let Some(state) = state {
        request = request.with_state(state);
    }

    let (grant, code_verifier): (Box<dyn Grant>, Option<String>) = match flow {
        Flow::Code => {
            let grant = PkceGrant::generate(
                Arc::new(config.token_exchange()?),
                config.redirect_uri_url()?,
            );
            let verifier = grant.pkce().verifier().as_str().to_string();
            (Box::new(grant) as Box<dyn Grant>, Some(verifier))
        }
        Flow::Implicit => {
            let grant = ImplicitGrant::new([ResponseType::Token, ResponseType::IdToken]);
            (Box::new(grant) as Box<dyn Grant>, None)
        }
    };

    Ok(AuthorizeOutput {
        url: request.build(grant.as_ref()).to_string(),
        state: request.state().to_string(),
        nonce,
        code_verifier,
    })
}
