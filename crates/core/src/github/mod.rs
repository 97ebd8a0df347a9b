/// GitHub-related transformations
///
/// Wire types for the REST API, the create-or-update decision for repository
/// files, Pages status classification and license text. Requests are sent by
/// the `repopilot` crate.
pub mod contents;
pub mod license;
pub mod pages;
pub mod types;

pub use contents::{
    decode_content, is_safe_repo_path, put_contents_body, ContentDecodeError, UpsertPlan,
};
pub use license::{license_owner, mit_license};
pub use pages::{pages_url, PagesStatus};
pub use types::{
    ContentFile, CreateRepoRequest, GitHubUser, PagesRequest, PagesSource, PutContentsRequest,
    PutContentsResponse, RepoRef, Repository, RepositoryOwner,
};
