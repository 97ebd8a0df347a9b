use std::path::{Path, PathBuf};

use log::{debug, warn};
use repopilot_core::attachments::{
    is_data_uri, is_text_attachment, join_summary, parse_data_uri, summary_line, text_preview,
    AttachmentPreview, PREVIEW_CHAR_LIMIT,
};
use repopilot_core::generate::{AttachmentRef, DecodedAttachment};
use tokio::io::AsyncReadExt;

use crate::prelude::*;

/// Bytes read for a character-bounded preview; a UTF-8 character is at most four bytes.
const PREVIEW_BYTE_LIMIT: u64 = (PREVIEW_CHAR_LIMIT * 4) as u64;

/// Only the final path component of an attachment name is used on disk.
fn scratch_path(dir: &Path, name: &str) -> Option<PathBuf> {
    Path::new(name)
        .file_name()
        .map(|file_name| dir.join(file_name))
}

async fn decode_one(attachment: &AttachmentRef, dir: &Path) -> Result<DecodedAttachment> {
    let uri = parse_data_uri(&attachment.url)?;
    let path = scratch_path(dir, &attachment.name)
        .ok_or_else(|| eyre!("'{}' is not a usable file name", attachment.name))?;

    tokio::fs::write(&path, &uri.bytes)
        .await
        .with_context(|| f!("Failed to write {}", path.display()))?;

    Ok(DecodedAttachment {
        name: attachment.name.clone(),
        local_path: path.display().to_string(),
        mime: uri.mime,
        size_bytes: uri.bytes.len() as u64,
    })
}

/// Decode data-URI attachments into `dir`.
///
/// Entries that are not data URIs are skipped silently. Entries that fail to
/// decode or write are logged and skipped. Order is preserved. Two entries with
/// the same name share one file and the later one wins.
pub async fn decode_attachments(attachments: &[AttachmentRef], dir: &Path) -> Vec<DecodedAttachment> {
    let mut saved = Vec::with_capacity(attachments.len());

    for attachment in attachments {
        if !is_data_uri(&attachment.url) {
            debug!("Skipping non data-URI attachment {}", attachment.name);
            continue;
        }

        match decode_one(attachment, dir).await {
            Ok(decoded) => saved.push(decoded),
            Err(e) => warn!("Failed to decode attachment {}: {e:#}", attachment.name),
        }
    }

    saved
}

/// Reads a bounded prefix and decodes it lossily; invalid UTF-8 never fails a preview.
async fn read_preview(attachment: &DecodedAttachment) -> std::io::Result<String> {
    let file = tokio::fs::File::open(&attachment.local_path).await?;

    let mut bytes = Vec::new();
    file.take(PREVIEW_BYTE_LIMIT).read_to_end(&mut bytes).await?;
    Ok(text_preview(&attachment.name, &String::from_utf8_lossy(&bytes)))
}

/// One summary line per attachment, in input order.
///
/// A preview that cannot be read becomes a placeholder line.
pub async fn summarize_attachments(attachments: &[DecodedAttachment]) -> String {
    let mut lines = Vec::with_capacity(attachments.len());

    for attachment in attachments {
        let preview = if is_text_attachment(&attachment.name, &attachment.mime) {
            match read_preview(attachment).await {
                Ok(text) => AttachmentPreview::Text(text),
                Err(e) => AttachmentPreview::Unreadable(e.to_string()),
            }
        } else {
            AttachmentPreview::Binary {
                size_bytes: attachment.size_bytes,
            }
        };

        lines.push(summary_line(&attachment.name, &attachment.mime, &preview));
    }

    join_summary(&lines)
}
