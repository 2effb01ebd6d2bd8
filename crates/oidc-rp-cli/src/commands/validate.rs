use anyhow::{Context, Result};
use colored::Colorize;
use oidc_rp::{ClaimError, ClaimsValidationPipeline, DecodedToken, RelyingPartyConfig};
use time::OffsetDateTime;

use crate::cli::ValidateArgs;
use crate::commands::load_config;
use crate::output::print_success;

pub fn validate(args: &ValidateArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let content = std::fs::read_to_string(&args.claims)
        .with_context(|| format!("Failed to read claims from {}", args.claims.display()))?;
    let token: DecodedToken =
        serde_json::from_str(&content).context("Claims file is not a JSON object")?;

    let base_time = match args.now {
        Some(epoch) => OffsetDateTime::from_unix_timestamp(epoch)
            .with_context(|| format!("--now {epoch} is out of range"))?,
        None => OffsetDateTime::now_utc(),
    };

    check_claims(&config, &token, args.nonce.as_deref(), base_time)
        .with_context(|| format!("ID token rejected ({})", "invalid".red()))?;

    print_success(&format!(
        "{} for subject {}",
        "valid".green(),
        token.subject().unwrap_or_default().cyan()
    ));
    Ok(())
}

pub fn check_claims(
    config: &RelyingPartyConfig,
    token: &DecodedToken,
    nonce: Option<&str>,
    base_time: OffsetDateTime,
) -> Result<(), ClaimError> {
    let context = config.validation_context(nonce, base_time);
    ClaimsValidationPipeline::from_context(&context).validate(token)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;
    use time::macros::datetime;

    use super::*;

    fn config() -> RelyingPartyConfig {
        RelyingPartyConfig::new(
            "https://auth.example.com/",
            "cli-client",
            "http://localhost:8765/callback",
        )
    }

    fn token() -> DecodedToken {
        serde_json::from_value(json!({
            "iss": "https://auth.example.com/",
            "sub": "user-1",
            "aud": "cli-client",
            "exp": 1_704_070_800,
            "iat": 1_704_067_200,
            "nonce": "n-1"
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_claims() {
        let now = datetime!(2024-01-01 0:30 UTC);
        assert_eq!(check_claims(&config(), &token(), Some("n-1"), now), Ok(()));
    }

    #[test]
    fn test_expired_claims() {
        let now = datetime!(2024-01-01 2:00 UTC);
        let err = check_claims(&config(), &token(), Some("n-1"), now).unwrap_err();
        assert!(err.is_expired());
    }

    #[test]
    fn test_nonce_mismatch() {
        let now = datetime!(2024-01-01 0:30 UTC);
        let err = check_claims(&config(), &token(), Some("n-2"), now).unwrap_err();
        assert_eq!(err, ClaimError::mismatched_nonce("n-1", "n-2"));
    }

    #[test]
    fn test_validate_command_reports_failure() {
        let mut config_file = tempfile::NamedTempFile::new().unwrap();
        write!(
            config_file,
            "issuer = \"https://auth.example.com/\"\nclient_id = \"cli-client\"\nredirect_uri = \"http://localhost:8765/callback\"\n"
        )
        .unwrap();
        let mut claims_file = tempfile::NamedTempFile::new().unwrap();
        write!(claims_file, "{{\"iss\": \"https://evil.example.com/\"}}").unwrap();

        let args = ValidateArgs {
            config: config_file.path().to_path_buf(),
            claims: claims_file.path().to_path_buf(),
            nonce: None,
            now: Some(1_704_067_200),
        };

        let err = validate(&args).unwrap_err();
        assert!(format!("{err:#}").contains("evil.example.com"));
    }
}
