use chrono::Datelike;
use repopilot_core::github::{license_owner, mit_license};

use crate::prelude::*;

/// Options for `license`
#[derive(Debug, clap::Args)]
pub struct LicenseOptions {
    /// Copyright holder (defaults to GITHUB_USERNAME)
    #[arg(long)]
    pub owner: Option<String>,

    /// Copyright year (defaults to the current year)
    #[arg(long)]
    pub year: Option<i32>,
}

/// Handle `license`.
pub async fn run(options: LicenseOptions, _global: crate::Global) -> Result<()> {
    let username = std::env::var("GITHUB_USERNAME").ok();
    let owner = license_owner(options.owner.as_deref(), username.as_deref());
    let year = options.year.unwrap_or_else(|| chrono::Utc::now().year());

    print!("{}", mit_license(year, owner));

    Ok(())
}
