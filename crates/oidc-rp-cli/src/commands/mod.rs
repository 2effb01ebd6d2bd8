pub mod authorize;
pub mod exchange;
pub mod pkce;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use oidc_rp::RelyingPartyConfig;

pub fn load_config(path: &Path) -> Result<RelyingPartyConfig> {
    let config = RelyingPartyConfig::from_file(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        issuer = %config.issuer,
        client_id = %config.client_id,
        "Using relying party configuration"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_load_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "issuer = \"https://auth.example.com/\"\nclient_id = \"cli-client\"\nredirect_uri = \"http://localhost:8765/callback\"\n"
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.issuer, "https://auth.example.com/");
        assert_eq!(config.client_id, "cli-client");
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/rp.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/rp.toml"));
    }
}
