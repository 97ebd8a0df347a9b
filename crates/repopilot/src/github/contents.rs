use std::path::PathBuf;

use colored::Colorize;
use log::info;
use repopilot_core::github::{
    decode_content, is_safe_repo_path, put_contents_body, RepoRef, UpsertPlan,
};
use serde::Serialize;

use super::{resolve_owner, GitHubApi, GitHubConfig};
use crate::prelude::{println, *};

/// Options for `github publish`
#[derive(Debug, clap::Args)]
pub struct PublishOptions {
    /// Repository name (owned by the authenticated user)
    #[arg(long)]
    pub repo: String,

    /// Path of the file inside the repository
    #[arg(long)]
    pub path: String,

    /// Local file to upload
    #[arg(long)]
    pub file: PathBuf,

    /// Commit message
    #[arg(long, short)]
    pub message: Option<String>,

    /// Upload raw bytes instead of UTF-8 text
    #[arg(long)]
    pub binary: bool,

    /// Repository owner (defaults to GITHUB_USERNAME or the authenticated user)
    #[arg(long)]
    pub owner: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// What an upsert did to the remote file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created { sha: String },
    Updated { previous_sha: String, sha: String },
}

impl UpsertOutcome {
    pub fn sha(&self) -> &str {
        match self {
            Self::Created { sha } | Self::Updated { sha, .. } => sha,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Self::Created { .. } => "Created",
            Self::Updated { .. } => "Updated",
        }
    }
}

/// Look up `path`, then create it or update it against the sha that was found.
///
/// A 404 on lookup is the create case. Every other error is returned.
async fn upsert_bytes<G: GitHubApi + ?Sized>(
    github: &G,
    repo: &RepoRef,
    path: &str,
    bytes: &[u8],
    message: &str,
) -> Result<UpsertOutcome, PublishError> {
    if !is_safe_repo_path(path) {
        return Err(PublishError::InvalidPath {
            path: path.to_string(),
        });
    }

    let existing = match github.get_contents(repo, path).await {
        Ok(file) => Some(file),
        Err(ApiError::NotFound) => None,
        Err(source) => {
            return Err(PublishError::Lookup {
                path: path.to_string(),
                source,
            })
        }
    };

    let plan = UpsertPlan::from_existing(existing.as_ref());
    let body = put_contents_body(&plan, message, bytes);

    let written = github
        .put_contents(repo, path, &body)
        .await
        .map_err(|source| PublishError::Write {
            path: path.to_string(),
            source,
        })?;

    let outcome = match plan {
        UpsertPlan::Create => UpsertOutcome::Created { sha: written.sha },
        UpsertPlan::Update { sha } => UpsertOutcome::Updated {
            previous_sha: sha,
            sha: written.sha,
        },
    };

    info!("{} {path} in {repo}", outcome.verb());
    Ok(outcome)
}

/// Create or update a text file.
pub async fn upsert_text_file<G: GitHubApi + ?Sized>(
    github: &G,
    repo: &RepoRef,
    path: &str,
    content: &str,
    message: &str,
) -> Result<UpsertOutcome, PublishError> {
    upsert_bytes(github, repo, path, content.as_bytes(), message).await
}

/// Create or update a binary file such as an image.
pub async fn upsert_binary_file<G: GitHubApi + ?Sized>(
    github: &G,
    repo: &RepoRef,
    path: &str,
    bytes: &[u8],
    message: &str,
) -> Result<UpsertOutcome, PublishError> {
    upsert_bytes(github, repo, path, bytes, message).await
}

/// Read a text file from a repository. `Ok(None)` when it does not exist.
pub async fn read_text_file<G: GitHubApi + ?Sized>(
    github: &G,
    repo: &RepoRef,
    path: &str,
) -> Result<Option<String>> {
    let file = match github.get_contents(repo, path).await {
        Ok(file) => file,
        Err(ApiError::NotFound) => return Ok(None),
        Err(e) => return Err(eyre!("Failed to read {path} from {repo}: {e}")),
    };

    let bytes = decode_content(&file).map_err(|e| eyre!("{e}"))?;
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

/// Upload a local file, as text or raw bytes.
pub async fn publish_local_file<G: GitHubApi + ?Sized>(
    github: &G,
    repo: &RepoRef,
    path: &str,
    local: &std::path::Path,
    message: &str,
    binary: bool,
) -> Result<UpsertOutcome, PublishError> {
    let read_error = |e: std::io::Error| PublishError::Read {
        path: path.to_string(),
        message: format!("{}: {e}", local.display()),
    };

    if binary {
        let bytes = tokio::fs::read(local).await.map_err(read_error)?;
        upsert_binary_file(github, repo, path, &bytes, message).await
    } else {
        let content = tokio::fs::read_to_string(local).await.map_err(read_error)?;
        upsert_text_file(github, repo, path, &content, message).await
    }
}

/// Handle `github publish`.
pub async fn handler<G: GitHubApi + ?Sized>(
    github: &G,
    config: GitHubConfig,
    options: PublishOptions,
) -> Result<()> {
    let config = config.with_owner(options.owner);
    let owner = resolve_owner(github, &config).await?;
    let repo = RepoRef::new(owner, options.repo);
    let message = options
        .message
        .unwrap_or_else(|| format!("Update {}", options.path));

    let outcome = publish_local_file(
        github,
        &repo,
        &options.path,
        &options.file,
        &message,
        options.binary,
    )
    .await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!(
            "{} {} in {} ({})",
            outcome.verb().green().bold(),
            options.path.bright_white(),
            repo.to_string().cyan(),
            outcome.sha().bright_black()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::fake::FakeGitHub;

    fn repo() -> RepoRef {
        RepoRef::new("octo", "app")
    }

    // ============================================================================
    // upsert_text_file tests
    // ============================================================================

    #[tokio::test]
    async fn test_missing_file_is_created() {
        let github = FakeGitHub::new("octo");

        let outcome = upsert_text_file(&github, &repo(), "index.html", "<p>1</p>", "Add index")
            .await
            .unwrap();

        assert!(matches!(outcome, UpsertOutcome::Created { .. }));
        assert_eq!(github.calls(), vec!["get index.html", "create index.html"]);
        let stored = github.file(&repo(), "index.html").unwrap();
        assert_eq!(stored.bytes, b"<p>1</p>");
        assert_eq!(stored.message, "Add index");
    }

    #[tokio::test]
    async fn test_second_publish_updates_with_returned_sha() {
        let github = FakeGitHub::new("octo");

        let first = upsert_text_file(&github, &repo(), "index.html", "<p>1</p>", "one")
            .await
            .unwrap();
        let second = upsert_text_file(&github, &repo(), "index.html", "<p>2</p>", "two")
            .await
            .unwrap();

        assert_eq!(
            second,
            UpsertOutcome::Updated {
                previous_sha: first.sha().to_string(),
                sha: github.file(&repo(), "index.html").unwrap().sha,
            }
        );
        assert_eq!(
            github.calls(),
            vec![
                "get index.html",
                "create index.html",
                "get index.html",
                "update index.html"
            ]
        );
        assert_eq!(github.file(&repo(), "index.html").unwrap().bytes, b"<p>2</p>");
    }

    #[tokio::test]
    async fn test_identical_republish_is_idempotent() {
        let github = FakeGitHub::new("octo");

        upsert_text_file(&github, &repo(), "README.md", "# Hi", "m")
            .await
            .unwrap();
        let again = upsert_text_file(&github, &repo(), "README.md", "# Hi", "m").await;

        assert!(again.is_ok());
        assert_eq!(github.file(&repo(), "README.md").unwrap().bytes, b"# Hi");
    }

    #[tokio::test]
    async fn test_lookup_error_other_than_not_found_propagates() {
        let github = FakeGitHub::new("octo");
        *github.lookup_error.lock().unwrap() = Some(ApiError::Status {
            status: 403,
            body: "forbidden".into(),
        });

        let err = upsert_text_file(&github, &repo(), "index.html", "x", "m")
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::Lookup { .. }));
        assert_eq!(err.path(), "index.html");
        assert_eq!(github.calls(), vec!["get index.html"]);
    }

    #[tokio::test]
    async fn test_write_error_propagates() {
        let github = FakeGitHub::new("octo");
        *github.write_error.lock().unwrap() = Some(ApiError::Transport("timed out".into()));

        let err = upsert_text_file(&github, &repo(), "index.html", "x", "m")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            PublishError::Write {
                path: "index.html".into(),
                source: ApiError::Transport("timed out".into()),
            }
        );
    }

    #[tokio::test]
    async fn test_dot_segments_are_rejected_before_any_call() {
        let github = FakeGitHub::new("octo");

        for path in ["../../victim/contents/index.html", "a/./b.txt", "", "a//b"] {
            let err = upsert_binary_file(&github, &repo(), path, b"x", "m")
                .await
                .unwrap_err();
            assert_eq!(
                err,
                PublishError::InvalidPath {
                    path: path.to_string()
                }
            );
        }

        assert!(github.calls().is_empty());
    }

    // ============================================================================
    // upsert_binary_file tests
    // ============================================================================

    #[tokio::test]
    async fn test_binary_upsert_round_trips_bytes() {
        let github = FakeGitHub::new("octo");
        let png = [0x89, b'P', b'N', b'G', 0x00, 0xff];

        let outcome = upsert_binary_file(&github, &repo(), "logo.png", &png, "Add logo")
            .await
            .unwrap();

        assert!(matches!(outcome, UpsertOutcome::Created { .. }));
        assert_eq!(github.file(&repo(), "logo.png").unwrap().bytes, png);
    }

    #[tokio::test]
    async fn test_binary_upsert_reports_failures_like_text() {
        let github = FakeGitHub::new("octo");
        *github.write_error.lock().unwrap() = Some(ApiError::Status {
            status: 422,
            body: "too large".into(),
        });

        let err = upsert_binary_file(&github, &repo(), "big.bin", &[0u8; 4], "m")
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::Write { .. }));
    }

    // ============================================================================
    // read_text_file / publish_local_file tests
    // ============================================================================

    #[tokio::test]
    async fn test_read_text_file() {
        let github = FakeGitHub::new("octo").with_file(&repo(), "README.md", b"# Old");

        assert_eq!(
            read_text_file(&github, &repo(), "README.md").await.unwrap(),
            Some("# Old".to_string())
        );
        assert_eq!(read_text_file(&github, &repo(), "missing.md").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_publish_local_file_missing_source() {
        let github = FakeGitHub::new("octo");
        let dir = tempfile::tempdir().unwrap();

        let err = publish_local_file(
            &github,
            &repo(),
            "index.html",
            &dir.path().join("nope.html"),
            "m",
            false,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PublishError::Read { .. }));
        assert!(github.calls().is_empty());
    }

    #[tokio::test]
    async fn test_publish_local_binary_file() {
        let github = FakeGitHub::new("octo");
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("img.bin");
        std::fs::write(&local, [1u8, 2, 3]).unwrap();

        publish_local_file(&github, &repo(), "img.bin", &local, "m", true)
            .await
            .unwrap();

        assert_eq!(github.file(&repo(), "img.bin").unwrap().bytes, vec![1, 2, 3]);
    }
}
