use clap::Args;

use devobs_core::types::{GitHubRepository, Website};
use devobs_core::validate::{validate_github_url, validate_website_url};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// URL to check
    pub url: String,

    /// Check as a website URL instead of a GitHub repository
    #[arg(long)]
    pub website: bool,
}

/// Runs offline, so duplicate detection has nothing to compare against.
pub fn run(args: &ValidateArgs) -> anyhow::Result<()> {
    let error = if args.website {
        validate_website_url(&args.url, &[] as &[Website])
    } else {
        validate_github_url(&args.url, &[] as &[GitHubRepository])
    };
    match error {
        Some(err) => Err(err.into()),
        None => {
            println!("{} is valid", args.url.trim());
            Ok(())
        }
    }
}
