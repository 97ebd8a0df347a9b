//! Data-URI attachment transformations
//!
//! Parsing of inline `data:` URIs and formatting of the one-line previews that
//! get embedded into generation prompts. Reading and writing the decoded bytes
//! is left to the caller.

use base64::Engine;

/// File extensions previewed as text regardless of their declared mime type.
pub const TEXT_EXTENSIONS: [&str; 4] = [".md", ".txt", ".json", ".csv"];

/// Maximum number of characters included in a text preview.
pub const PREVIEW_CHAR_LIMIT: usize = 1000;

/// Number of leading lines included in a CSV preview.
pub const CSV_PREVIEW_LINES: usize = 3;

/// Errors produced while decoding a data URI
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataUriError {
    #[error("not a data URI")]
    NotDataUri,

    #[error("data URI has no ',' separating header and payload")]
    MissingPayload,

    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
}

/// A decoded data URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Returns true when `url` uses the `data:` scheme.
pub fn is_data_uri(url: &str) -> bool {
    url.starts_with("data:")
}

/// Decode a `data:<mime>;base64,<payload>` URI.
///
/// The header and payload are split at the first comma. The mime type is the
/// header segment between `data:` and the first `;` (empty when absent).
pub fn parse_data_uri(url: &str) -> Result<DataUri, DataUriError> {
    let header_and_payload = url.strip_prefix("data:").ok_or(DataUriError::NotDataUri)?;
    let (header, payload) = header_and_payload
        .split_once(',')
        .ok_or(DataUriError::MissingPayload)?;

    let mime = header.split(';').next().unwrap_or_default().to_string();

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| DataUriError::InvalidBase64(e.to_string()))?;

    Ok(DataUri { mime, bytes })
}

/// Encode raw bytes as a base64 data URI.
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{encoded}")
}

/// Infer MIME type from file extension.
pub fn mime_from_extension(filename: &str) -> &'static str {
    let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "md" => "text/markdown",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

/// Whether an attachment should be previewed as text.
pub fn is_text_attachment(name: &str, mime: &str) -> bool {
    mime.starts_with("text") || TEXT_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Whether an attachment preview should be line-based.
pub fn is_csv(name: &str) -> bool {
    name.ends_with(".csv")
}

/// Build a single-line text preview.
///
/// CSV files contribute their first [`CSV_PREVIEW_LINES`] lines (each trimmed);
/// anything else contributes at most [`PREVIEW_CHAR_LIMIT`] characters. Newlines
/// are escaped as a literal `\n` so the preview stays on one line.
pub fn text_preview(name: &str, content: &str) -> String {
    if is_csv(name) {
        return content
            .lines()
            .take(CSV_PREVIEW_LINES)
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("\\n");
    }

    let head: String = content.chars().take(PREVIEW_CHAR_LIMIT).collect();
    head.replace('\n', "\\n")
        .chars()
        .take(PREVIEW_CHAR_LIMIT)
        .collect()
}

/// What could be learned about an attachment's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentPreview {
    Text(String),
    Binary { size_bytes: u64 },
    Unreadable(String),
}

/// Format one summary line for an attachment.
pub fn summary_line(name: &str, mime: &str, preview: &AttachmentPreview) -> String {
    match preview {
        AttachmentPreview::Text(text) => format!("- {name} ({mime}): preview: {text}"),
        AttachmentPreview::Binary { size_bytes } => format!("- {name} ({mime}): {size_bytes} bytes"),
        AttachmentPreview::Unreadable(reason) => {
            format!("- {name} ({mime}): (could not read preview: {reason})")
        }
    }
}

/// Join summary lines into the blob embedded in prompts, one line per attachment.
pub fn join_summary(lines: &[String]) -> String {
    lines.join("\n")
}
