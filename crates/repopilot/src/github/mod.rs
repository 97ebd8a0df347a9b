pub mod contents;
pub mod pages;
pub mod repo;

#[cfg(test)]
pub(crate) mod fake;

use std::time::Duration;

use async_trait::async_trait;
use repopilot_core::github::{
    is_safe_repo_path, ContentFile, CreateRepoRequest, GitHubUser, PagesRequest,
    PutContentsRequest, PutContentsResponse, RepoRef, Repository,
};
use serde::de::DeserializeOwned;

use crate::prelude::{println, *};

/// Repository calls are bounded by this timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// GitHub commands
#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Fetch or create a public repository
    #[clap(name = "ensure")]
    Ensure(repo::EnsureOptions),

    /// Create or update a single file in a repository
    #[clap(name = "publish")]
    Publish(contents::PublishOptions),

    /// Enable GitHub Pages for a repository
    #[clap(name = "pages")]
    Pages(pages::PagesOptions),
}

/// GitHub module app - root command
#[derive(Debug, clap::Parser)]
#[command(name = "github")]
#[command(about = "GitHub repository operations")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

/// GitHub configuration from environment variables
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub api_base: String,
    pub token: String,
    pub username: Option<String>,
}

impl GitHubConfig {
    /// Default GitHub REST API base URL
    pub const DEFAULT_API_BASE: &'static str = "https://api.github.com";

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_base: std::env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| Self::DEFAULT_API_BASE.to_string()),
            token: std::env::var("GITHUB_TOKEN")
                .map_err(|_| eyre!("GITHUB_TOKEN environment variable not set"))?,
            username: std::env::var("GITHUB_USERNAME")
                .ok()
                .filter(|u| !u.trim().is_empty()),
        })
    }

    /// Apply CLI overrides to the configuration
    pub fn with_owner(mut self, owner: Option<String>) -> Self {
        if let Some(owner) = owner {
            self.username = Some(owner);
        }
        self
    }
}

/// The subset of the GitHub REST API used by repopilot.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// `GET /user`
    async fn authenticated_user(&self) -> Result<GitHubUser, ApiError>;

    /// `GET /user/repos`, most recently updated first
    async fn list_repos(&self, limit: usize) -> Result<Vec<Repository>, ApiError>;

    /// `GET /repos/{owner}/{repo}`
    async fn get_repo(&self, repo: &RepoRef) -> Result<Repository, ApiError>;

    /// `POST /user/repos`
    async fn create_repo(&self, body: &CreateRepoRequest) -> Result<Repository, ApiError>;

    /// `GET /repos/{owner}/{repo}/contents/{path}`
    async fn get_contents(&self, repo: &RepoRef, path: &str) -> Result<ContentFile, ApiError>;

    /// `PUT /repos/{owner}/{repo}/contents/{path}`
    async fn put_contents(
        &self,
        repo: &RepoRef,
        path: &str,
        body: &PutContentsRequest,
    ) -> Result<ContentFile, ApiError>;

    /// `POST /repos/{owner}/{repo}/pages`, returning the raw status code and body.
    async fn request_pages(
        &self,
        repo: &RepoRef,
        body: &PagesRequest,
    ) -> Result<(u16, String), ApiError>;
}

/// Authenticated GitHub REST client
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
}

impl GitHubClient {
    /// Create an authenticated HTTP client with bearer auth headers
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.token))
                .map_err(|e| eyre!("Invalid header value: {}", e))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("repopilot"));
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn repo_url(&self, repo: &RepoRef) -> String {
        format!(
            "{}/repos/{}/{}",
            self.api_base,
            urlencoding::encode(&repo.owner),
            urlencoding::encode(&repo.name)
        )
    }

    fn contents_url(&self, repo: &RepoRef, path: &str) -> Result<String, ApiError> {
        if !is_safe_repo_path(path) {
            return Err(ApiError::InvalidPath(path.to_string()));
        }
        Ok(format!("{}/contents/{}", self.repo_url(repo), encode_path(path)))
    }
}

/// Percent-encode each segment of a repository path, keeping the separators.
fn encode_path(path: &str) -> String {
    path.trim_start_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Check that an HTTP response was successful, mapping 404 to [`ApiError::NotFound`].
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn send_json<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, ApiError> {
    let response = check_response(request.send().await?).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn authenticated_user(&self) -> Result<GitHubUser, ApiError> {
        send_json(self.http.get(format!("{}/user", self.api_base))).await
    }

    async fn list_repos(&self, limit: usize) -> Result<Vec<Repository>, ApiError> {
        let per_page = limit.clamp(1, 100).to_string();
        send_json(
            self.http
                .get(format!("{}/user/repos", self.api_base))
                .query(&[("sort", "updated"), ("per_page", per_page.as_str())]),
        )
        .await
    }

    async fn get_repo(&self, repo: &RepoRef) -> Result<Repository, ApiError> {
        send_json(self.http.get(self.repo_url(repo))).await
    }

    async fn create_repo(&self, body: &CreateRepoRequest) -> Result<Repository, ApiError> {
        send_json(
            self.http
                .post(format!("{}/user/repos", self.api_base))
                .json(body),
        )
        .await
    }

    async fn get_contents(&self, repo: &RepoRef, path: &str) -> Result<ContentFile, ApiError> {
        send_json(self.http.get(self.contents_url(repo, path)?)).await
    }

    async fn put_contents(
        &self,
        repo: &RepoRef,
        path: &str,
        body: &PutContentsRequest,
    ) -> Result<ContentFile, ApiError> {
        let response: PutContentsResponse =
            send_json(self.http.put(self.contents_url(repo, path)?).json(body)).await?;
        Ok(response.content)
    }

    async fn request_pages(
        &self,
        repo: &RepoRef,
        body: &PagesRequest,
    ) -> Result<(u16, String), ApiError> {
        let response = self
            .http
            .post(format!("{}/pages", self.repo_url(repo)))
            .json(body)
            .send()
            .await?;
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        Ok((status, text))
    }
}

/// Resolve the repository owner: configured username, else the authenticated login.
pub async fn resolve_owner<G: GitHubApi + ?Sized>(
    github: &G,
    config: &GitHubConfig,
) -> Result<String> {
    if let Some(username) = &config.username {
        return Ok(username.clone());
    }

    let user = github
        .authenticated_user()
        .await
        .map_err(|e| eyre!("Failed to resolve authenticated user: {}", e))?;
    Ok(user.login)
}

/// Module entry point
pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let config = GitHubConfig::from_env()?;

    if global.verbose {
        println!("GitHub API Base: {}", config.api_base);
        println!();
    }

    let client = GitHubClient::new(&config)?;

    match app.command {
        Commands::Ensure(options) => repo::handler(&client, config, options).await,
        Commands::Publish(options) => contents::handler(&client, config, options).await,
        Commands::Pages(options) => pages::handler(&client, config, options).await,
    }
}
