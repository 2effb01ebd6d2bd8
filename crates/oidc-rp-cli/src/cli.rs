use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "oidc-rp")]
#[command(about = "OpenID Connect relying-party toolbox: PKCE, authorize URLs, ID token claims")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, env = "OIDC_RP_LOG", default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a PKCE verifier and its S256 challenge
    Pkce(PkceArgs),
    /// Build an authorization URL for a login
    AuthorizeUrl(AuthorizeUrlArgs),
    /// Validate already-verified ID token claims
    Validate(ValidateArgs),
    /// Exchange an authorization code at the token endpoint
    Exchange(ExchangeArgs),
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum Flow {
    /// Authorization code with PKCE (default)
    #[default]
    Code,
    /// Implicit flow returning `token id_token`
    Implicit,
}

#[derive(clap::Args)]
pub struct PkceArgs {
    /// Random bytes per verifier (32-96)
    #[arg(long, default_value_t = oidc_rp::pkce::DEFAULT_ENTROPY_BYTES)]
    pub entropy_bytes: usize,
}

#[derive(clap::Args)]
pub struct AuthorizeUrlArgs {
    /// Relying party configuration file (TOML)
    #[arg(short, long, env = "OIDC_RP_CONFIG")]
    pub config: PathBuf,
    /// Login flow
    #[arg(long, default_value = "code")]
    pub flow: Flow,
    /// State value (generated when omitted)
    #[arg(long)]
    pub state: Option<String>,
}

#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Relying party configuration file (TOML)
    #[arg(short, long, env = "OIDC_RP_CONFIG")]
    pub config: PathBuf,
    /// JSON file with the ID token claims
    #[arg(long)]
    pub claims: PathBuf,
    /// Nonce sent with the authorization request
    #[arg(long)]
    pub nonce: Option<String>,
    /// Reference time as seconds since the Unix epoch (defaults to now)
    #[arg(long)]
    pub now: Option<i64>,
}

#[derive(clap::Args)]
pub struct ExchangeArgs {
    /// Relying party configuration file (TOML)
    #[arg(short, long, env = "OIDC_RP_CONFIG")]
    pub config: PathBuf,
    /// Authorization code returned to the redirect URI
    #[arg(long)]
    pub code: String,
    /// PKCE verifier generated for the authorization request
    #[arg(long)]
    pub verifier: String,
}
