use colored::Colorize;
use log::warn;
use repopilot_core::github::Repository;
use serde::Serialize;

use crate::generate::{AiPipeClient, CompletionConfig};
use crate::github::{GitHubApi, GitHubClient, GitHubConfig};
use crate::prelude::{println, *};

/// Number of repositories and models listed by the smoke check.
const SAMPLE_SIZE: usize = 5;

/// Options for `check`
#[derive(Debug, clap::Args)]
pub struct CheckOptions {
    /// Skip the completion service check
    #[arg(long)]
    pub skip_models: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// What the GitHub credentials can see.
#[derive(Debug, Clone, Serialize)]
pub struct GitHubIdentity {
    pub login: String,
    /// Set when `GITHUB_USERNAME` names someone other than the token's owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configured_username: Option<String>,
    pub repositories: Vec<String>,
}

impl GitHubIdentity {
    pub fn username_mismatch(&self) -> bool {
        self.configured_username.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModelsCheck {
    Ok { models: Vec<String> },
    Failed { error: String },
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub github: GitHubIdentity,
    pub completion: ModelsCheck,
}

/// Resolve the token's login and list a few of its repositories.
pub async fn check_github<G: GitHubApi + ?Sized>(
    github: &G,
    config: &GitHubConfig,
) -> Result<GitHubIdentity> {
    let user = github
        .authenticated_user()
        .await
        .map_err(|e| eyre!("GitHub authentication failed: {}", e))?;

    let configured_username = config
        .username
        .clone()
        .filter(|username| *username != user.login);
    if let Some(username) = &configured_username {
        warn!("GITHUB_USERNAME ({username}) doesn't match the token's login ({})", user.login);
    }

    let repositories = github
        .list_repos(SAMPLE_SIZE)
        .await
        .map_err(|e| eyre!("Failed to list repositories: {}", e))?
        .into_iter()
        .take(SAMPLE_SIZE)
        .map(|repo: Repository| repo.name)
        .collect();

    Ok(GitHubIdentity {
        login: user.login,
        configured_username,
        repositories,
    })
}

fn print_report(report: &CheckReport) {
    let identity = &report.github;
    println!(
        "{} {}",
        "GitHub authenticated as:".green().bold(),
        identity.login.cyan()
    );
    if let Some(username) = &identity.configured_username {
        println!(
            "{} GITHUB_USERNAME ({}) doesn't match the actual login ({})",
            "Warning:".yellow().bold(),
            username,
            identity.login
        );
    }

    println!();
    println!("{}", format!("First {SAMPLE_SIZE} repositories:").bold());
    let mut table = new_table();
    for name in &identity.repositories {
        table.add_row(prettytable::row!["-", name]);
    }
    table.printstd();

    println!();
    match &report.completion {
        ModelsCheck::Ok { models } => {
            println!("{}", "Completion service authenticated. Available models:".green().bold());
            let mut table = new_table();
            for model in models {
                table.add_row(prettytable::row!["-", model]);
            }
            table.printstd();
        }
        ModelsCheck::Failed { error } => {
            println!("{} {}", "Completion service check failed:".red().bold(), error)
        }
        ModelsCheck::Skipped => println!("{}", "Completion service check skipped".bright_black()),
    }
}

/// Handle `check`.
pub async fn run(options: CheckOptions, global: crate::Global) -> Result<()> {
    let github_config = GitHubConfig::from_env()?;

    if global.verbose {
        println!("GitHub API Base: {}", github_config.api_base);
        println!();
    }

    let github = GitHubClient::new(&github_config)?;
    let identity = check_github(&github, &github_config).await?;

    let completion = if options.skip_models {
        ModelsCheck::Skipped
    } else {
        let client = AiPipeClient::new(CompletionConfig::from_env())?;
        match client.list_models().await {
            Ok(models) => ModelsCheck::Ok {
                models: models.into_iter().take(SAMPLE_SIZE).collect(),
            },
            Err(e) => ModelsCheck::Failed {
                error: e.to_string(),
            },
        }
    };

    let report = CheckReport {
        github: identity,
        completion,
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}
