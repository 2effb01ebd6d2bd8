mod cli;
mod commands;
mod observability;
mod output;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    observability::init_tracing(&cli.log_level);

    match &cli.command {
        Commands::Pkce(args) => {
            commands::pkce::generate(args)?;
        }
        Commands::AuthorizeUrl(args) => {
            commands::authorize::authorize_url(args)?;
        }
        Commands::Validate(args) => {
            commands::validate::validate(args)?;
        }
        Commands::Exchange(args) => {
            commands::exchange::exchange(args).await?;
        }
    }

    Ok(())
}
