use std::path::Path;

use chrono::Datelike;
use colored::Colorize;
use log::{info, warn};
use repopilot_core::generate::{GenerationRequest, INDEX_FILE, README_FILE};
use repopilot_core::github::{license_owner, mit_license, PagesStatus, RepoRef};
use serde::Serialize;

use crate::generate::{generate_app_code, AiPipeClient, CompletionApi, CompletionConfig, RequestArgs};
use crate::github::contents::{publish_local_file, read_text_file, upsert_text_file, UpsertOutcome};
use crate::github::pages::{enable_pages, print_status};
use crate::github::repo::ensure_repository;
use crate::github::{resolve_owner, GitHubApi, GitHubClient, GitHubConfig};
use crate::prelude::{println, *};

const LICENSE_FILE: &str = "LICENSE";

/// Options for `deploy`
#[derive(Debug, clap::Args)]
pub struct DeployOptions {
    /// Repository name (created when missing)
    #[arg(long)]
    pub repo: String,

    /// Description used when the repository has to be created
    #[arg(long, default_value = "")]
    pub description: String,

    /// Owner used to look up an existing repository (defaults to GITHUB_USERNAME
    /// or the authenticated user). Missing repositories are always created under
    /// the authenticated user.
    #[arg(long)]
    pub owner: Option<String>,

    #[clap(flatten)]
    pub request: RequestArgs,

    /// Enable GitHub Pages once the files are pushed
    #[arg(long)]
    pub pages: bool,

    /// Branch served by GitHub Pages
    #[arg(long, default_value = "main")]
    pub branch: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of publishing one file.
#[derive(Debug, Clone, Serialize)]
pub struct PublishedFile {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<UpsertOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything a deploy did, in the order it happened.
#[derive(Debug, Clone, Serialize)]
pub struct DeployReport {
    /// The repository that was written to, as reported by GitHub.
    pub repo: RepoRef,
    pub html_url: String,
    pub round: u32,
    pub fallback: bool,
    pub files: Vec<PublishedFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<PagesStatus>,
}

/// Where and how to deploy, independent of the CLI.
#[derive(Debug, Clone)]
pub struct DeployTarget<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub description: &'a str,
    pub pages_branch: Option<&'a str>,
    pub year: i32,
}

fn commit_message(round: u32, path: &str) -> String {
    format!("Round {round}: update {path}")
}

/// Generate an app and push it to a repository.
///
/// Files are written one after the other: `index.html`, `README.md` and
/// `LICENSE` first, then every decoded attachment. A failure on one of the
/// three text files aborts the deploy; a failed attachment is logged and
/// recorded in the report. Nothing already written is rolled back.
pub async fn deploy<G, C>(
    github: &G,
    completion: &C,
    target: &DeployTarget<'_>,
    mut request: GenerationRequest,
) -> Result<DeployReport>
where
    G: GitHubApi + ?Sized,
    C: CompletionApi + ?Sized,
{
    let repository =
        ensure_repository(github, target.owner, target.repo, target.description).await?;
    let repo = repository.repo_ref();

    if request.round == 2 && request.previous_readme.is_none() {
        request.previous_readme = read_text_file(github, &repo, README_FILE).await?;
        if request.previous_readme.is_none() {
            warn!("Round 2 requested but {repo} has no {README_FILE}");
        }
    }

    let generation = generate_app_code(completion, &request).await?;
    let result = &generation.result;

    let license = mit_license(target.year, license_owner(None, Some(&repo.owner)));
    let text_files = [
        (INDEX_FILE, result.index_html()),
        (README_FILE, result.readme()),
        (LICENSE_FILE, license.as_str()),
    ];

    let mut files = Vec::with_capacity(text_files.len() + result.attachments.len());
    for (path, content) in text_files {
        let outcome =
            upsert_text_file(github, &repo, path, content, &commit_message(request.round, path))
                .await?;
        files.push(PublishedFile {
            path: path.to_string(),
            outcome: Some(outcome),
            error: None,
        });
    }

    for attachment in &result.attachments {
        let published = publish_local_file(
            github,
            &repo,
            &attachment.name,
            Path::new(&attachment.local_path),
            &commit_message(request.round, &attachment.name),
            true,
        )
        .await;

        files.push(match published {
            Ok(outcome) => PublishedFile {
                path: attachment.name.clone(),
                outcome: Some(outcome),
                error: None,
            },
            Err(e) => {
                warn!("Skipping attachment {}: {e}", attachment.name);
                PublishedFile {
                    path: attachment.name.clone(),
                    outcome: None,
                    error: Some(e.to_string()),
                }
            }
        });
    }

    let pages = match target.pages_branch {
        Some(branch) => Some(enable_pages(github, &repo, branch).await?),
        None => None,
    };

    info!("Deployed round {} to {repo}", request.round);

    Ok(DeployReport {
        repo: repo.clone(),
        html_url: repository.html_url.clone(),
        round: request.round,
        fallback: result.fallback,
        files,
        pages,
    })
}

fn print_report(report: &DeployReport) {
    println!(
        "{} {}",
        report.repo.full_name().bold().cyan(),
        report.html_url.bright_black()
    );
    if report.fallback {
        println!("{}", "Completion failed, fallback content was published".yellow());
    }
    println!();

    let mut table = new_table();
    table.add_row(prettytable::row!["File", "Action", "SHA"]);
    for file in &report.files {
        match (&file.outcome, &file.error) {
            (Some(outcome), _) => {
                table.add_row(prettytable::row![file.path, outcome.verb(), outcome.sha()]);
            }
            (None, error) => {
                table.add_row(prettytable::row![
                    file.path,
                    "Failed",
                    error.as_deref().unwrap_or_default()
                ]);
            }
        }
    }
    table.printstd();

    if let Some(status) = &report.pages {
        println!();
        print_status(status, &report.repo.owner, &report.repo.name);
    }
}

/// Handle `deploy`.
pub async fn run(options: DeployOptions, global: crate::Global) -> Result<()> {
    let github_config = GitHubConfig::from_env()?.with_owner(options.owner.clone());
    let completion_config = CompletionConfig::from_env().with_model(options.request.model.clone());

    if global.verbose {
        println!("GitHub API Base: {}", github_config.api_base);
        println!("Completion endpoint: {}", completion_config.base_url);
        println!("Model: {}", completion_config.model);
        println!();
    }

    if completion_config.token.is_none() {
        warn!("AIPIPE_TOKEN is not set, the fallback app will be deployed");
    }

    let github = GitHubClient::new(&github_config)?;
    let completion = AiPipeClient::new(completion_config)?;
    let owner = resolve_owner(&github, &github_config).await?;
    let request = options.request.load().await?;

    let target = DeployTarget {
        owner: &owner,
        repo: &options.repo,
        description: &options.description,
        pages_branch: options.pages.then_some(options.branch.as_str()),
        year: chrono::Utc::now().year(),
    };

    let report = deploy(&github, &completion, &target, request).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.pages.as_ref().is_some_and(PagesStatus::is_rejected) {
        return Err(eyre!("GitHub rejected the Pages request for {}", report.repo));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::completion::FakeCompletion;
    use crate::generate::CompletionError;
    use crate::github::fake::FakeGitHub;
    use repopilot_core::attachments::encode_data_uri;
    use repopilot_core::generate::AttachmentRef;

    fn target(pages_branch: Option<&str>) -> DeployTarget<'_> {
        DeployTarget {
            owner: "octo",
            repo: "todo",
            description: "A todo app",
            pages_branch,
            year: 2026,
        }
    }

    fn repo() -> RepoRef {
        RepoRef::new("octo", "todo")
    }

    #[tokio::test]
    async fn test_first_deploy_creates_repo_and_files() {
        let github = FakeGitHub::new("octo");
        let completion = FakeCompletion::replying("<div>todo</div>\n---README.md---\n# Todo\n");

        let report = deploy(
            &github,
            &completion,
            &target(None),
            GenerationRequest::new("Build a todo app"),
        )
        .await
        .unwrap();

        assert_eq!(report.repo, repo());
        assert!(!report.fallback);
        assert_eq!(
            report.files.iter().map(|f| f.path.as_str()).collect::<Vec<_>>(),
            vec!["index.html", "README.md", "LICENSE"]
        );
        assert!(report
            .files
            .iter()
            .all(|f| matches!(f.outcome, Some(UpsertOutcome::Created { .. }))));

        assert_eq!(github.file(&repo(), "index.html").unwrap().bytes, b"<div>todo</div>");
        assert_eq!(github.file(&repo(), "README.md").unwrap().bytes, b"# Todo");
        let license = String::from_utf8(github.file(&repo(), "LICENSE").unwrap().bytes).unwrap();
        assert!(license.contains("Copyright (c) 2026 octo"));
        assert_eq!(
            github.file(&repo(), "index.html").unwrap().message,
            "Round 1: update index.html"
        );
    }

    #[tokio::test]
    async fn test_round_two_reads_previous_readme_and_updates() {
        let github = FakeGitHub::new("octo")
            .with_repo("todo", "A todo app")
            .with_file(&repo(), "README.md", b"# Todo v1")
            .with_file(&repo(), "index.html", b"<p>v1</p>");
        let completion = FakeCompletion::replying("<p>v2</p>\n---README.md---\n# Todo v2");
        let mut request = GenerationRequest::new("Add due dates");
        request.round = 2;

        let report = deploy(&github, &completion, &target(None), request)
            .await
            .unwrap();

        let prompts = completion.prompts.lock().unwrap();
        assert!(prompts[0].1.contains("### Previous README.md:\n# Todo v1"));
        assert!(matches!(
            report.files[0].outcome,
            Some(UpsertOutcome::Updated { .. })
        ));
        assert!(matches!(
            report.files[1].outcome,
            Some(UpsertOutcome::Updated { .. })
        ));
        assert!(matches!(
            report.files[2].outcome,
            Some(UpsertOutcome::Created { .. })
        ));
        assert_eq!(github.file(&repo(), "index.html").unwrap().bytes, b"<p>v2</p>");
    }

    #[tokio::test]
    async fn test_failed_completion_publishes_fallback() {
        let github = FakeGitHub::new("octo");
        let completion = FakeCompletion::failing(CompletionError::Transport("timed out".into()));

        let report = deploy(
            &github,
            &completion,
            &target(None),
            GenerationRequest::new("Build a todo app"),
        )
        .await
        .unwrap();

        assert!(report.fallback);
        let html = String::from_utf8(github.file(&repo(), "index.html").unwrap().bytes).unwrap();
        assert!(html.contains("Build a todo app"));
    }

    #[tokio::test]
    async fn test_attachments_are_published_as_binary() {
        let github = FakeGitHub::new("octo");
        let completion = FakeCompletion::replying("a\n---README.md---\nb");
        let mut request = GenerationRequest::new("Show the logo");
        request.attachments = vec![AttachmentRef {
            name: "logo.png".into(),
            url: encode_data_uri("image/png", &[0x89, 0x50, 0x4e, 0x47]),
        }];

        let report = deploy(&github, &completion, &target(None), request)
            .await
            .unwrap();

        assert_eq!(report.files.len(), 4);
        assert_eq!(report.files[3].path, "logo.png");
        assert_eq!(
            github.file(&repo(), "logo.png").unwrap().bytes,
            vec![0x89, 0x50, 0x4e, 0x47]
        );
    }

    #[tokio::test]
    async fn test_report_uses_repository_returned_by_github() {
        // The fake creates under its own login, like POST /user/repos does
        let github = FakeGitHub::new("octo");
        *github.pages_response.lock().unwrap() = (201, String::new());
        let completion = FakeCompletion::replying("a\n---README.md---\nb");
        let target = DeployTarget {
            owner: "some-org",
            ..target(Some("main"))
        };

        let report = deploy(&github, &completion, &target, GenerationRequest::new("x"))
            .await
            .unwrap();

        assert_eq!(report.repo, repo());
        assert_eq!(github.calls().last().unwrap(), "pages octo/todo main");
        let license = String::from_utf8(github.file(&repo(), "LICENSE").unwrap().bytes).unwrap();
        assert!(license.contains("Copyright (c) 2026 octo"));
    }

    #[tokio::test]
    async fn test_attachment_with_dot_segments_is_skipped() {
        let github = FakeGitHub::new("octo");
        let completion = FakeCompletion::replying("a\n---README.md---\nb");
        let mut request = GenerationRequest::new("x");
        request.attachments = vec![AttachmentRef {
            name: "../../victim/contents/index.html".into(),
            url: encode_data_uri("text/html", b"<p>x</p>"),
        }];

        let report = deploy(&github, &completion, &target(None), request)
            .await
            .unwrap();

        let skipped = &report.files[3];
        assert!(skipped.outcome.is_none());
        assert!(skipped.error.as_deref().unwrap().contains("not a valid repository path"));
        assert!(!github
            .calls()
            .iter()
            .any(|call| call.contains("victim")));
    }

    #[tokio::test]
    async fn test_text_publish_failure_aborts() {
        let github = FakeGitHub::new("octo");
        *github.write_error.lock().unwrap() = Some(crate::error::ApiError::Status {
            status: 403,
            body: "forbidden".into(),
        });
        let completion = FakeCompletion::replying("a\n---README.md---\nb");

        let result = deploy(
            &github,
            &completion,
            &target(None),
            GenerationRequest::new("x"),
        )
        .await;

        assert!(result.is_err());
        assert!(github.calls().contains(&"create index.html".to_string()));
        assert!(!github.calls().contains(&"get README.md".to_string()));
    }

    #[tokio::test]
    async fn test_pending_pages_is_reported() {
        let github = FakeGitHub::new("octo");
        *github.pages_response.lock().unwrap() = (202, String::new());
        let completion = FakeCompletion::replying("a\n---README.md---\nb");

        let report = deploy(
            &github,
            &completion,
            &target(Some("main")),
            GenerationRequest::new("x"),
        )
        .await
        .unwrap();

        assert_eq!(report.pages, Some(PagesStatus::Pending));
        assert_eq!(github.calls().last().unwrap(), "pages octo/todo main");
    }
}
