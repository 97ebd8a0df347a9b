//! App generation transformations
//!
//! Prompt assembly, deterministic fallback content, and splitting of a raw
//! completion into the generated files. None of these functions touch the
//! network or the filesystem.

pub mod fallback;
pub mod prompt;
pub mod split;
pub mod types;

pub use fallback::{fallback_completion, fallback_html, fallback_readme};
pub use prompt::{build_prompt, PromptInput, SYSTEM_MESSAGE};
pub use split::{split_response, strip_code_block, SplitContext, README_MARKER};
pub use types::{
    AttachmentRef, DecodedAttachment, GeneratedFiles, GenerationRequest, GenerationResult,
    INDEX_FILE, README_FILE,
};
