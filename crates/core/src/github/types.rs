use serde::{Deserialize, Serialize};

/// Identifies a repository as `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// `GET /user` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

/// Repository owner as embedded in repository responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
}

/// Repository API response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub owner: RepositoryOwner,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub default_branch: Option<String>,
}

impl Repository {
    pub fn repo_ref(&self) -> RepoRef {
        RepoRef::new(&self.owner.login, &self.name)
    }
}

/// `POST /user/repos` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRepoRequest {
    pub name: String,
    pub description: String,
    pub private: bool,
    pub auto_init: bool,
}

impl CreateRepoRequest {
    /// A public repository without an initial commit.
    pub fn public(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            private: false,
            auto_init: false,
        }
    }
}

/// File metadata from the contents API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentFile {
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub size: u64,
    /// Base64 content, present on `GET` responses for files.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

/// `PUT /repos/{owner}/{repo}/contents/{path}` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutContentsRequest {
    pub message: String,
    /// Base64-encoded file content.
    pub content: String,
    /// Blob sha of the file being replaced; absent when creating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// `PUT /repos/{owner}/{repo}/contents/{path}` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutContentsResponse {
    pub content: ContentFile,
}

/// `POST /repos/{owner}/{repo}/pages` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagesRequest {
    pub source: PagesSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagesSource {
    pub branch: String,
    pub path: String,
}

impl PagesRequest {
    /// Serve the root of `branch`.
    pub fn branch_root(branch: impl Into<String>) -> Self {
        Self {
            source: PagesSource {
                branch: branch.into(),
                path: "/".to_string(),
            },
        }
    }
}
