/// Failure talking to the GitHub REST API
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,

    #[error("GitHub API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid repository path: '{0}'")]
    InvalidPath(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Failure to create or update a repository file.
///
/// Returned by both the text and the binary upsert.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("Failed to look up {path}: {source}")]
    Lookup { path: String, source: ApiError },

    #[error("Failed to write {path}: {source}")]
    Write { path: String, source: ApiError },

    #[error("Failed to read local file for {path}: {message}")]
    Read { path: String, message: String },

    #[error("'{path}' is not a valid repository path")]
    InvalidPath { path: String },
}

impl PublishError {
    pub fn path(&self) -> &str {
        match self {
            Self::Lookup { path, .. }
            | Self::Write { path, .. }
            | Self::Read { path, .. }
            | Self::InvalidPath { path } => path,
        }
    }
}
