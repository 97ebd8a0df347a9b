use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// File name of the generated application markup.
pub const INDEX_FILE: &str = "index.html";

/// File name of the generated README.
pub const README_FILE: &str = "README.md";

/// An inline attachment supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// File name the attachment is stored under.
    #[serde(default = "default_attachment_name")]
    pub name: String,
    /// Expected to be a data URI; anything else is skipped.
    #[serde(default)]
    pub url: String,
}

fn default_attachment_name() -> String {
    "attachment".to_string()
}

/// A request to generate a web app from a brief.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub brief: String,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
    #[serde(default)]
    pub checks: Vec<String>,
    /// Generation iteration: 1 for the initial build, 2 for a revision.
    #[serde(default = "default_round")]
    pub round: u32,
    /// README from the previous round. Only used when `round == 2`.
    #[serde(default)]
    pub previous_readme: Option<String>,
}

fn default_round() -> u32 {
    1
}

impl GenerationRequest {
    pub fn new(brief: impl Into<String>) -> Self {
        Self {
            brief: brief.into(),
            attachments: Vec::new(),
            checks: Vec::new(),
            round: default_round(),
            previous_readme: None,
        }
    }

    /// The previous README, but only when it is meaningful for this round.
    pub fn revision_context(&self) -> Option<&str> {
        match (self.round, self.previous_readme.as_deref()) {
            (2, Some(readme)) => Some(readme),
            _ => None,
        }
    }
}

/// An attachment that was decoded to local scratch storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedAttachment {
    pub name: String,
    pub local_path: String,
    pub mime: String,
    pub size_bytes: u64,
}

/// The two files produced for every generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFiles {
    pub index_html: String,
    pub readme: String,
}

impl GeneratedFiles {
    /// Files keyed by their repository file name.
    pub fn to_map(&self) -> BTreeMap<&'static str, &str> {
        BTreeMap::from([(INDEX_FILE, self.index_html.as_str()), (README_FILE, self.readme.as_str())])
    }
}

/// Outcome of a generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationResult {
    pub files: BTreeMap<String, String>,
    pub attachments: Vec<DecodedAttachment>,
    /// True when the completion service failed and fallback content was used.
    pub fallback: bool,
}

impl GenerationResult {
    pub fn new(files: GeneratedFiles, attachments: Vec<DecodedAttachment>, fallback: bool) -> Self {
        let files = files
            .to_map()
            .into_iter()
            .map(|(name, content)| (name.to_string(), content.to_string()))
            .collect();

        Self {
            files,
            attachments,
            fallback,
        }
    }

    pub fn index_html(&self) -> &str {
        self.files.get(INDEX_FILE).map(String::as_str).unwrap_or_default()
    }

    pub fn readme(&self) -> &str {
        self.files.get(README_FILE).map(String::as_str).unwrap_or_default()
    }
}
