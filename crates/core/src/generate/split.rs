use super::fallback::fallback_readme;
use super::types::GeneratedFiles;

/// Line separating the app markup from the README in a completion.
pub const README_MARKER: &str = "---README.md---";

/// Code-fence delimiter stripped from each part.
pub const CODE_FENCE: &str = "```";

/// Return the content of the first fenced block, or the trimmed text.
///
/// The block is whatever sits between the first and second fence delimiter,
/// so an info string such as `html` directly after the opening fence is kept.
pub fn strip_code_block(text: &str) -> String {
    match text.split(CODE_FENCE).nth(1) {
        Some(block) => block.trim().to_string(),
        None => text.trim().to_string(),
    }
}

/// Metadata needed to synthesize a README when the completion has none.
#[derive(Debug, Clone, Copy)]
pub struct SplitContext<'a> {
    pub brief: &'a str,
    pub checks: &'a [String],
    pub attachments_meta: &'a str,
    pub round: u32,
}

/// Split a raw completion into `index.html` and `README.md`.
///
/// Splits on the first [`README_MARKER`]. Without a marker the whole text is
/// treated as code and the README comes from [`fallback_readme`].
pub fn split_response(text: &str, ctx: &SplitContext<'_>) -> GeneratedFiles {
    match text.split_once(README_MARKER) {
        Some((code, readme)) => GeneratedFiles {
            index_html: strip_code_block(code),
            readme: strip_code_block(readme),
        },
        None => GeneratedFiles {
            index_html: strip_code_block(text),
            readme: fallback_readme(ctx.brief, ctx.checks, ctx.attachments_meta, ctx.round),
        },
    }
}
