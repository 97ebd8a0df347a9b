//! In-memory GitHub used by tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use repopilot_core::github::{
    ContentFile, CreateRepoRequest, GitHubUser, PagesRequest, PutContentsRequest, RepoRef,
    Repository, RepositoryOwner,
};

use super::GitHubApi;
use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub bytes: Vec<u8>,
    pub sha: String,
    pub message: String,
}

#[derive(Debug, Default)]
struct State {
    repos: HashMap<String, Repository>,
    files: HashMap<(String, String), StoredFile>,
    calls: Vec<String>,
    next_sha: u32,
}

/// Records every call and enforces the sha precondition on updates.
pub struct FakeGitHub {
    login: String,
    state: Mutex<State>,
    pub lookup_error: Mutex<Option<ApiError>>,
    pub write_error: Mutex<Option<ApiError>>,
    pub pages_response: Mutex<(u16, String)>,
}

impl FakeGitHub {
    pub fn new(login: &str) -> Self {
        Self {
            login: login.to_string(),
            state: Mutex::new(State::default()),
            lookup_error: Mutex::new(None),
            write_error: Mutex::new(None),
            pages_response: Mutex::new((201, String::new())),
        }
    }

    pub fn with_repo(self, name: &str, description: &str) -> Self {
        let repo = self.repository(name, description);
        self.state
            .lock()
            .unwrap()
            .repos
            .insert(repo.full_name.clone(), repo);
        self
    }

    pub fn with_file(self, repo: &RepoRef, path: &str, bytes: &[u8]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.next_sha += 1;
            let sha = format!("sha-{}", state.next_sha);
            state.files.insert(
                (repo.full_name(), path.to_string()),
                StoredFile {
                    bytes: bytes.to_vec(),
                    sha,
                    message: "seed".into(),
                },
            );
        }
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn file(&self, repo: &RepoRef, path: &str) -> Option<StoredFile> {
        self.state
            .lock()
            .unwrap()
            .files
            .get(&(repo.full_name(), path.to_string()))
            .cloned()
    }

    pub fn repo(&self, full_name: &str) -> Option<Repository> {
        self.state.lock().unwrap().repos.get(full_name).cloned()
    }

    fn repository(&self, name: &str, description: &str) -> Repository {
        Repository {
            name: name.to_string(),
            full_name: format!("{}/{name}", self.login),
            owner: RepositoryOwner {
                login: self.login.clone(),
            },
            html_url: format!("https://github.com/{}/{name}", self.login),
            description: Some(description.to_string()),
            private: false,
            default_branch: Some("main".into()),
        }
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl GitHubApi for FakeGitHub {
    async fn authenticated_user(&self) -> Result<GitHubUser, ApiError> {
        self.record("user".into());
        Ok(GitHubUser {
            login: self.login.clone(),
        })
    }

    async fn list_repos(&self, limit: usize) -> Result<Vec<Repository>, ApiError> {
        self.record("list_repos".into());
        let state = self.state.lock().unwrap();
        let mut repos: Vec<_> = state.repos.values().cloned().collect();
        repos.sort_by(|a, b| a.name.cmp(&b.name));
        repos.truncate(limit);
        Ok(repos)
    }

    async fn get_repo(&self, repo: &RepoRef) -> Result<Repository, ApiError> {
        self.record(format!("get_repo {repo}"));
        self.repo(&repo.full_name()).ok_or(ApiError::NotFound)
    }

    async fn create_repo(&self, body: &CreateRepoRequest) -> Result<Repository, ApiError> {
        self.record(format!("create_repo {}", body.name));
        let repo = self.repository(&body.name, &body.description);
        let mut state = self.state.lock().unwrap();
        if state.repos.contains_key(&repo.full_name) {
            return Err(ApiError::Status {
                status: 422,
                body: "name already exists on this account".into(),
            });
        }
        state.repos.insert(repo.full_name.clone(), repo.clone());
        Ok(repo)
    }

    async fn get_contents(&self, repo: &RepoRef, path: &str) -> Result<ContentFile, ApiError> {
        use base64::Engine;

        self.record(format!("get {path}"));
        if let Some(err) = self.lookup_error.lock().unwrap().clone() {
            return Err(err);
        }
        let stored = self.file(repo, path).ok_or(ApiError::NotFound)?;
        Ok(ContentFile {
            path: path.to_string(),
            sha: stored.sha,
            size: stored.bytes.len() as u64,
            content: Some(base64::engine::general_purpose::STANDARD.encode(&stored.bytes)),
            encoding: Some("base64".into()),
        })
    }

    async fn put_contents(
        &self,
        repo: &RepoRef,
        path: &str,
        body: &PutContentsRequest,
    ) -> Result<ContentFile, ApiError> {
        use base64::Engine;

        let verb = if body.sha.is_some() { "update" } else { "create" };
        self.record(format!("{verb} {path}"));
        if let Some(err) = self.write_error.lock().unwrap().clone() {
            return Err(err);
        }

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&body.content)
            .map_err(|e| ApiError::Status {
                status: 422,
                body: e.to_string(),
            })?;

        let key = (repo.full_name(), path.to_string());
        let mut state = self.state.lock().unwrap();
        let current = state.files.get(&key).map(|f| f.sha.clone());
        if current != body.sha {
            return Err(ApiError::Status {
                status: 409,
                body: format!("{path} does not match {:?}", body.sha),
            });
        }

        state.next_sha += 1;
        let sha = format!("sha-{}", state.next_sha);
        state.files.insert(
            key,
            StoredFile {
                bytes: bytes.clone(),
                sha: sha.clone(),
                message: body.message.clone(),
            },
        );

        Ok(ContentFile {
            path: path.to_string(),
            sha,
            size: bytes.len() as u64,
            content: None,
            encoding: None,
        })
    }

    async fn request_pages(
        &self,
        repo: &RepoRef,
        body: &PagesRequest,
    ) -> Result<(u16, String), ApiError> {
        self.record(format!("pages {repo} {}", body.source.branch));
        Ok(self.pages_response.lock().unwrap().clone())
    }
}
