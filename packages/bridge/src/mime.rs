//! MIME types for documents.

use crate::document_id::{extension, last_segment};
use crate::kind::NodeKind;

/// MIME type reported for directories.
pub const DIRECTORY_MIME_TYPE: &str = "inode/directory";

/// MIME type reported for files with an unrecognized extension.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// MIME type of a document, from its kind and extension.
pub fn mime_type_of(id: &str, kind: NodeKind) -> &'static str {
    if kind.is_directory() {
        return DIRECTORY_MIME_TYPE;
    }

    let Some(ext) = extension(last_segment(id)) else {
        return FALLBACK_MIME_TYPE;
    };

    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "ico" => "image/x-icon",
        "tif" | "tiff" => "image/tiff",
        _ => FALLBACK_MIME_TYPE,
    }
}

/// Whether `mime_type` is accepted by a filter such as `image/*`.
///
/// A filter is either an exact type, `type/*`, or `*/*`.
pub fn mime_matches(filter: &str, mime_type: &str) -> bool {
    if filter == "*/*" || filter == mime_type {
        return true;
    }
    match filter.strip_suffix("/*") {
        Some(top_level) => mime_type
            .split_once('/')
            .is_some_and(|(top, _)| top.eq_ignore_ascii_case(top_level)),
        None => false,
    }
}
