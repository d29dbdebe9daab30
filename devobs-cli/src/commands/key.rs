use clap::Args;
use serde::Serialize;

use devobs_core::normalize::{normalize_domain, normalize_name, website_key_prefix};

use super::print_json;

#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Website URL
    pub url: String,
}

#[derive(Serialize)]
struct KeyParts {
    domain: String,
    name: String,
    prefix: String,
}

pub fn run(args: &KeyArgs, json: bool) -> anyhow::Result<()> {
    let parts = KeyParts {
        domain: normalize_domain(&args.url),
        name: normalize_name(&args.url),
        prefix: website_key_prefix(&args.url),
    };
    if parts.domain.is_empty() {
        anyhow::bail!("Invalid URL {:?}: no host", args.url);
    }
    if json {
        return print_json(&parts);
    }
    println!("{}", parts.prefix);
    Ok(())
}
