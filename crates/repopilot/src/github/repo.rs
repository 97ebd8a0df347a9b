use colored::Colorize;
use log::info;
use repopilot_core::github::{CreateRepoRequest, RepoRef, Repository};

use super::{resolve_owner, GitHubApi, GitHubConfig};
use crate::prelude::{println, *};

/// Options for `github ensure`
#[derive(Debug, clap::Args)]
pub struct EnsureOptions {
    /// Repository name
    pub name: String,

    /// Description used when the repository has to be created
    #[arg(long, default_value = "")]
    pub description: String,

    /// Owner used to look up an existing repository (defaults to GITHUB_USERNAME
    /// or the authenticated user). Missing repositories are always created under
    /// the authenticated user.
    #[arg(long)]
    pub owner: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Return `owner/name`, creating a public repository when it does not exist.
///
/// An existing repository is returned untouched, whatever `description` says.
pub async fn ensure_repository<G: GitHubApi + ?Sized>(
    github: &G,
    owner: &str,
    name: &str,
    description: &str,
) -> Result<Repository> {
    let repo_ref = RepoRef::new(owner, name);

    match github.get_repo(&repo_ref).await {
        Ok(repo) => {
            info!("Repo already exists: {}", repo.full_name);
            return Ok(repo);
        }
        Err(ApiError::NotFound) => {}
        Err(e) => return Err(eyre!("Failed to look up repository {repo_ref}: {e}")),
    }

    let repo = github
        .create_repo(&CreateRepoRequest::public(name, description))
        .await
        .map_err(|e| eyre!("Failed to create repository {repo_ref}: {e}"))?;

    info!("Created repo: {}", repo.full_name);
    Ok(repo)
}

/// Handle `github ensure`.
pub async fn handler<G: GitHubApi + ?Sized>(
    github: &G,
    config: GitHubConfig,
    options: EnsureOptions,
) -> Result<()> {
    let config = config.with_owner(options.owner);
    let owner = resolve_owner(github, &config).await?;
    let repo = ensure_repository(github, &owner, &options.name, &options.description).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&repo)?);
    } else {
        println!(
            "{} {}",
            repo.full_name.bold().cyan(),
            repo.html_url.bright_black()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::fake::FakeGitHub;

    #[tokio::test]
    async fn test_creates_missing_repository() {
        let github = FakeGitHub::new("octo");

        let repo = ensure_repository(&github, "octo", "todo", "A todo app")
            .await
            .unwrap();

        assert_eq!(repo.full_name, "octo/todo");
        assert!(!repo.private);
        assert_eq!(github.calls(), vec!["get_repo octo/todo", "create_repo todo"]);
    }

    #[tokio::test]
    async fn test_existing_repository_is_not_modified() {
        let github = FakeGitHub::new("octo").with_repo("todo", "original");

        let repo = ensure_repository(&github, "octo", "todo", "something else")
            .await
            .unwrap();

        assert_eq!(repo.description.as_deref(), Some("original"));
        assert_eq!(github.calls(), vec!["get_repo octo/todo"]);
    }

    #[tokio::test]
    async fn test_ensure_twice_returns_same_repository() {
        let github = FakeGitHub::new("octo");

        let first = ensure_repository(&github, "octo", "todo", "d").await.unwrap();
        let second = ensure_repository(&github, "octo", "todo", "d").await.unwrap();

        assert_eq!(first.full_name, second.full_name);
        assert_eq!(
            github.calls(),
            vec!["get_repo octo/todo", "create_repo todo", "get_repo octo/todo"]
        );
    }
}
