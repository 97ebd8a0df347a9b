use serde::Serialize;

/// Result of asking GitHub to enable Pages for a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PagesStatus {
    /// The site is configured (201 Created or 204 No Content).
    Enabled,
    /// GitHub accepted the request and is still building (202 Accepted).
    Pending,
    /// Any other status code.
    Rejected { code: u16, body: String },
}

impl PagesStatus {
    pub fn from_response(code: u16, body: &str) -> Self {
        match code {
            201 | 204 => Self::Enabled,
            202 => Self::Pending,
            code => Self::Rejected {
                code,
                body: body.to_string(),
            },
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Public URL of a user Pages site for `repo`.
pub fn pages_url(owner: &str, repo: &str) -> String {
    format!("https://{}.github.io/{}/", owner.to_lowercase(), repo)
}
