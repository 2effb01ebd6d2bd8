use anyhow::Result;
use oidc_rp::PkceChallengeGenerator;
use serde_json::json;

use crate::cli::PkceArgs;
use crate::output::print_json;

pub fn generate(args: &PkceArgs) -> Result<()> {
    let params = PkceChallengeGenerator::with_entropy_bytes(args.entropy_bytes)?.generate();

    print_json(&json!({
        "code_verifier": params.verifier().as_str(),
        "code_challenge": params.challenge().as_str(),
        "code_challenge_method": params.method().as_str(),
    }))
}
