use std::sync::Arc;

use anyhow::{Context, Result};
use oidc_rp::{Grant, GrantValues, PkceGrant, PkceParameters, PkceVerifier};

use crate::cli::ExchangeArgs;
use crate::commands::load_config;
use crate::output::print_json;

pub async fn exchange(args: &ExchangeArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let verifier = PkceVerifier::new(args.verifier.as_str()).context("Invalid --verifier")?;

    let grant = PkceGrant::new(
        Arc::new(config.token_exchange()?),
        config.redirect_uri_url()?,
        PkceParameters::from_verifier(verifier),
    );

    let values = GrantValues::from([("code".to_string(), args.code.clone())]);
    let credentials = grant
        .resolve_credentials(&values)
        .await
        .context("Code exchange failed")?;

    print_json(&credentials)
}
