use colored::Colorize;
use log::{info, warn};
use repopilot_core::github::{pages_url, PagesRequest, PagesStatus, RepoRef};

use super::{resolve_owner, GitHubApi, GitHubConfig};
use crate::prelude::{println, *};

/// Options for `github pages`
#[derive(Debug, clap::Args)]
pub struct PagesOptions {
    /// Repository name
    pub repo: String,

    /// Branch to serve
    #[arg(long, default_value = "main")]
    pub branch: String,

    /// Repository owner (defaults to GITHUB_USERNAME or the authenticated user)
    #[arg(long)]
    pub owner: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Ask GitHub to serve `branch` as a Pages site.
///
/// A 202 is reported as [`PagesStatus::Pending`], not as a failure.
pub async fn enable_pages<G: GitHubApi + ?Sized>(
    github: &G,
    repo: &RepoRef,
    branch: &str,
) -> Result<PagesStatus> {
    let (code, body) = github
        .request_pages(repo, &PagesRequest::branch_root(branch))
        .await
        .map_err(|e| eyre!("Failed to call Pages API for {repo}: {e}"))?;

    let status = PagesStatus::from_response(code, &body);
    match &status {
        PagesStatus::Enabled => info!("Pages enabled for {repo}"),
        PagesStatus::Pending => info!("Pages build pending for {repo}"),
        PagesStatus::Rejected { code, body } => warn!("Pages API returned {code}: {body}"),
    }

    Ok(status)
}

/// Handle `github pages`.
pub async fn handler<G: GitHubApi + ?Sized>(
    github: &G,
    config: GitHubConfig,
    options: PagesOptions,
) -> Result<()> {
    let config = config.with_owner(options.owner);
    let owner = resolve_owner(github, &config).await?;
    let repo = RepoRef::new(&owner, &options.repo);

    let status = enable_pages(github, &repo, &options.branch).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print_status(&status, &owner, &options.repo);
    }

    if status.is_rejected() {
        return Err(eyre!("GitHub rejected the Pages request for {repo}"));
    }

    Ok(())
}

pub fn print_status(status: &PagesStatus, owner: &str, repo: &str) {
    let url = pages_url(owner, repo);
    match status {
        PagesStatus::Enabled => {
            println!("{} {}", "Pages enabled:".green().bold(), url)
        }
        PagesStatus::Pending => println!(
            "{} {} {}",
            "Pages pending:".yellow().bold(),
            url,
            "(GitHub is still building the site)".bright_black()
        ),
        PagesStatus::Rejected { code, body } => println!(
            "{} [{}] {}",
            "Pages rejected:".red().bold(),
            code,
            body
        ),
    }
}
