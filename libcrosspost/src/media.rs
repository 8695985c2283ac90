//! Local media file checks: extension gating and size ceilings.

use std::path::Path;

use crate::error::{CrosspostError, Result};

/// Per-file ceiling for photo uploads
pub const PHOTO_MAX_BYTES: u64 = 8 * 1024 * 1024;

/// Ceiling for document uploads
pub const DOCUMENT_MAX_BYTES: u64 = 100 * 1024 * 1024;

/// Local video files larger than this are upgraded to an async upload
/// unless the caller set the async flag explicitly.
pub const VIDEO_ASYNC_THRESHOLD_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
    Document,
}

impl MediaKind {
    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Photo => &["jpg", "jpeg", "png", "gif", "webp"],
            MediaKind::Video => &["mp4", "mov", "avi", "webm", "m4v"],
            MediaKind::Document => &["pdf", "doc", "docx", "ppt", "pptx"],
        }
    }

    /// Hard size ceiling, if the kind has one. Video has no hard ceiling,
    /// only the async-upgrade threshold.
    pub fn max_bytes(&self) -> Option<u64> {
        match self {
            MediaKind::Photo => Some(PHOTO_MAX_BYTES),
            MediaKind::Video => None,
            MediaKind::Document => Some(DOCUMENT_MAX_BYTES),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::Document => "document",
        }
    }
}

/// MIME type for a file path, by extension. Unknown extensions fall back
/// to octet-stream; extension gating happens before upload, so this only
/// labels content already accepted.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("webm") => "video/webm",
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("ppt") => "application/vnd.ms-powerpoint",
        Some("pptx") => {
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        }
        _ => "application/octet-stream",
    }
}

/// Validate a local file for the given media kind and return its size.
///
/// Checks, in order: the file exists, its extension is accepted for the
/// kind, and its size is under the kind's ceiling. Each violation is an
/// input error naming the concrete limit.
pub fn check_local_file(path: &Path, kind: MediaKind) -> Result<u64> {
    let metadata = std::fs::metadata(path).map_err(|_| {
        CrosspostError::InvalidInput(format!("File not found: {}", path.display()))
    })?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if !kind.allowed_extensions().contains(&ext.as_str()) {
        return Err(CrosspostError::InvalidInput(format!(
            "Unsupported {} format '.{}' for {}. Supported formats: {}",
            kind.as_str(),
            ext,
            path.display(),
            kind.allowed_extensions().join(", ")
        )));
    }

    let size = metadata.len();
    if let Some(max) = kind.max_bytes() {
        if size > max {
            return Err(CrosspostError::InvalidInput(format!(
                "{} exceeds the {} MB {} limit ({} bytes)",
                path.display(),
                max / (1024 * 1024),
                kind.as_str(),
                size
            )));
        }
    }

    Ok(size)
}
