use base64::Engine;

use super::types::{ContentFile, PutContentsRequest};

/// What an upsert has to do after looking up the existing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertPlan {
    Create,
    /// Replace the file whose current blob sha is given.
    Update { sha: String },
}

impl UpsertPlan {
    /// Plan from a lookup result; `None` means the file was not found.
    pub fn from_existing(existing: Option<&ContentFile>) -> Self {
        match existing {
            Some(file) => Self::Update {
                sha: file.sha.clone(),
            },
            None => Self::Create,
        }
    }
}

/// Build the create-or-update body for `bytes`.
pub fn put_contents_body(plan: &UpsertPlan, message: &str, bytes: &[u8]) -> PutContentsRequest {
    let sha = match plan {
        UpsertPlan::Create => None,
        UpsertPlan::Update { sha } => Some(sha.clone()),
    };

    PutContentsRequest {
        message: message.to_string(),
        content: base64::engine::general_purpose::STANDARD.encode(bytes),
        sha,
    }
}

/// Whether `path` names a file inside the repository.
///
/// Empty, `.` and `..` segments are rejected: once URL-encoded they are still
/// resolved as dot segments and could address another repository's contents.
pub fn is_safe_repo_path(path: &str) -> bool {
    let path = path.trim_start_matches('/');
    !path.is_empty()
        && path
            .split('/')
            .all(|segment| !matches!(segment, "" | "." | ".."))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentDecodeError {
    #[error("{0} has no inline content")]
    MissingContent(String),

    #[error("{path} uses unsupported encoding '{encoding}'")]
    UnsupportedEncoding { path: String, encoding: String },

    #[error("{path} has invalid base64 content: {message}")]
    InvalidBase64 { path: String, message: String },
}

/// Decode the inline content of a contents-API file.
///
/// The API wraps base64 at 60 columns, so whitespace is removed first.
pub fn decode_content(file: &ContentFile) -> Result<Vec<u8>, ContentDecodeError> {
    let content = file
        .content
        .as_deref()
        .ok_or_else(|| ContentDecodeError::MissingContent(file.path.clone()))?;

    if let Some(encoding) = file.encoding.as_deref() {
        if encoding != "base64" {
            return Err(ContentDecodeError::UnsupportedEncoding {
                path: file.path.clone(),
                encoding: encoding.to_string(),
            });
        }
    }

    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| ContentDecodeError::InvalidBase64 {
            path: file.path.clone(),
            message: e.to_string(),
        })
}
