//! Request building
//!
//! Turns resolved parameters plus content input into one canonical
//! [`PostRequest`] per content type, then fans that out into the exact
//! wire field set the upstream API expects. Building is pure apart from
//! reading local file metadata; a build either fully succeeds or fails
//! before any network call is made.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{CrosspostError, Result};
use crate::media::{self, MediaKind, VIDEO_ASYNC_THRESHOLD_BYTES};
use crate::platform::{ContentType, Platform, PlatformField};
use crate::resolve::ResolvedParams;

/// Media for a photo post: a carousel of local files or of remote URLs,
/// never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaList {
    Files(Vec<PathBuf>),
    Urls(Vec<String>),
}

/// Media for a video or document post: one local file or one remote URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaItem {
    File(PathBuf),
    Url(String),
}

/// Fields common to every content type
#[derive(Debug, Clone, Serialize)]
pub struct PostUniversal {
    pub profile: String,
    pub platforms: Vec<Platform>,
    pub schedule_at: Option<DateTime<Utc>>,
    pub queue: bool,
    pub async_upload: bool,
    pub first_comment: Option<String>,
    /// Sparse per-platform overrides, keyed by the closed field enumeration
    pub fields: BTreeMap<PlatformField, String>,
}

/// One logical post, ready for the wire. Immutable once built; consumed
/// exactly once.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "content_type", rename_all = "lowercase")]
pub enum PostRequest {
    Text {
        #[serde(flatten)]
        universal: PostUniversal,
        body: String,
    },
    Photo {
        #[serde(flatten)]
        universal: PostUniversal,
        title: String,
        media: MediaList,
    },
    Video {
        #[serde(flatten)]
        universal: PostUniversal,
        title: String,
        media: MediaItem,
    },
    Document {
        #[serde(flatten)]
        universal: PostUniversal,
        title: String,
        media: MediaItem,
    },
}

/// Content supplied by the CLI layer, already reduced to typed values.
/// For text, source selection (inline, file, stdin) has already happened.
#[derive(Debug, Clone)]
pub enum ContentInput {
    Text {
        body: String,
    },
    Photo {
        title: String,
        files: Vec<PathBuf>,
        urls: Vec<String>,
    },
    Video {
        title: String,
        file: Option<PathBuf>,
        url: Option<String>,
    },
    Document {
        title: String,
        file: Option<PathBuf>,
        url: Option<String>,
    },
}

impl ContentInput {
    pub fn content_type(&self) -> ContentType {
        match self {
            ContentInput::Text { .. } => ContentType::Text,
            ContentInput::Photo { .. } => ContentType::Photo,
            ContentInput::Video { .. } => ContentType::Video,
            ContentInput::Document { .. } => ContentType::Document,
        }
    }
}

/// One outbound field. Text fields carry their value inline; file fields
/// are read by the transport at send time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireField {
    Text { name: String, value: String },
    File { name: String, path: PathBuf },
}

impl WireField {
    fn text(name: &str, value: impl Into<String>) -> Self {
        WireField::Text {
            name: name.to_string(),
            value: value.into(),
        }
    }
}

/// Build a [`PostRequest`] from resolved parameters and content input.
pub fn build(input: ContentInput, resolved: &ResolvedParams) -> Result<PostRequest> {
    match input {
        ContentInput::Text { body } => build_text(body, resolved),
        ContentInput::Photo { title, files, urls } => build_photo(title, files, urls, resolved),
        ContentInput::Video { title, file, url } => build_video(title, file, url, resolved),
        ContentInput::Document { title, file, url } => {
            build_document(title, file, url, resolved)
        }
    }
}

fn universal(resolved: &ResolvedParams, async_upload: bool) -> PostUniversal {
    PostUniversal {
        profile: resolved.profile.clone(),
        platforms: resolved.platforms.clone(),
        schedule_at: resolved.schedule_at,
        queue: resolved.queue,
        async_upload,
        first_comment: resolved.first_comment.clone(),
        fields: resolved.fields.clone(),
    }
}

fn require_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(CrosspostError::InvalidInput(
            "Missing required field: title. Pass it with --title".to_string(),
        ));
    }
    Ok(())
}

fn build_text(body: String, resolved: &ResolvedParams) -> Result<PostRequest> {
    if body.trim().is_empty() {
        return Err(CrosspostError::InvalidInput(
            "Post body cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(PostRequest::Text {
        universal: universal(resolved, resolved.async_upload.unwrap_or(false)),
        body,
    })
}

fn build_photo(
    title: String,
    files: Vec<PathBuf>,
    urls: Vec<String>,
    resolved: &ResolvedParams,
) -> Result<PostRequest> {
    // Exclusivity is checked before anything touches an individual file.
    let media = match (files.is_empty(), urls.is_empty()) {
        (false, false) => {
            return Err(CrosspostError::InvalidInput(
                "Photo posts accept local files or remote URLs, not both".to_string(),
            ))
        }
        (true, true) => {
            return Err(CrosspostError::InvalidInput(
                "Photo posts need media: pass --file or --url".to_string(),
            ))
        }
        (false, true) => {
            for path in &files {
                media::check_local_file(path, MediaKind::Photo)?;
            }
            MediaList::Files(files)
        }
        (true, false) => MediaList::Urls(urls),
    };

    require_title(&title)?;

    Ok(PostRequest::Photo {
        universal: universal(resolved, resolved.async_upload.unwrap_or(false)),
        title,
        media,
    })
}

fn build_video(
    title: String,
    file: Option<PathBuf>,
    url: Option<String>,
    resolved: &ResolvedParams,
) -> Result<PostRequest> {
    require_title(&title)?;

    let (media, size) = match (file, url) {
        (Some(_), Some(_)) => {
            return Err(CrosspostError::InvalidInput(
                "Video posts accept a local file or a remote URL, not both".to_string(),
            ))
        }
        (None, None) => {
            return Err(CrosspostError::InvalidInput(
                "Video posts need media: pass --file or --url".to_string(),
            ))
        }
        (Some(path), None) => {
            let size = media::check_local_file(&path, MediaKind::Video)?;
            (MediaItem::File(path), Some(size))
        }
        (None, Some(url)) => (MediaItem::Url(url), None),
    };

    // Large local files are upgraded to an async upload, but only when the
    // caller never expressed a preference: an explicit false stays false.
    let async_upload = match resolved.async_upload {
        Some(explicit) => explicit,
        None => size.map(|s| s > VIDEO_ASYNC_THRESHOLD_BYTES).unwrap_or(false),
    };

    Ok(PostRequest::Video {
        universal: universal(resolved, async_upload),
        title,
        media,
    })
}

fn build_document(
    title: String,
    file: Option<PathBuf>,
    url: Option<String>,
    resolved: &ResolvedParams,
) -> Result<PostRequest> {
    // Documents have no multi-platform concept at all, so this is stricter
    // than the capability check: any explicit non-linkedin target fails
    // before building.
    let offenders: Vec<&Platform> = resolved
        .platforms
        .iter()
        .filter(|p| **p != Platform::Linkedin)
        .collect();
    if !offenders.is_empty() {
        return Err(CrosspostError::InvalidInput(format!(
            "Document posts target linkedin only; remove: {}",
            offenders
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }

    require_title(&title)?;

    let media = match (file, url) {
        (Some(_), Some(_)) => {
            return Err(CrosspostError::InvalidInput(
                "Document posts accept a local file or a remote URL, not both".to_string(),
            ))
        }
        (None, None) => {
            return Err(CrosspostError::InvalidInput(
                "Document posts need media: pass --file or --url".to_string(),
            ))
        }
        (Some(path), None) => {
            media::check_local_file(&path, MediaKind::Document)?;
            MediaItem::File(path)
        }
        (None, Some(url)) => MediaItem::Url(url),
    };

    Ok(PostRequest::Document {
        universal: universal(resolved, resolved.async_upload.unwrap_or(false)),
        title,
        media,
    })
}

impl PostRequest {
    pub fn content_type(&self) -> ContentType {
        match self {
            PostRequest::Text { .. } => ContentType::Text,
            PostRequest::Photo { .. } => ContentType::Photo,
            PostRequest::Video { .. } => ContentType::Video,
            PostRequest::Document { .. } => ContentType::Document,
        }
    }

    pub fn universal(&self) -> &PostUniversal {
        match self {
            PostRequest::Text { universal, .. }
            | PostRequest::Photo { universal, .. }
            | PostRequest::Video { universal, .. }
            | PostRequest::Document { universal, .. } => universal,
        }
    }

    /// Whether the outbound call needs a multipart body (any local file)
    pub fn has_local_files(&self) -> bool {
        self.wire_fields()
            .iter()
            .any(|f| matches!(f, WireField::File { .. }))
    }

    /// The exact outbound field set: universal fields first, then the
    /// sparse per-platform overrides under their wire keys, then the
    /// content fields. Carousel lists pass through in caller order.
    pub fn wire_fields(&self) -> Vec<WireField> {
        let u = self.universal();
        let mut out = Vec::new();

        out.push(WireField::text("profile", u.profile.clone()));
        out.push(WireField::text(
            "platforms",
            u.platforms
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(","),
        ));
        out.push(WireField::text(
            "content_type",
            self.content_type().as_str(),
        ));
        if let Some(at) = u.schedule_at {
            out.push(WireField::text("schedule_at", at.to_rfc3339()));
        }
        if u.queue {
            out.push(WireField::text("queue", "true"));
        }
        if u.async_upload {
            out.push(WireField::text("async", "true"));
        }
        if let Some(comment) = &u.first_comment {
            out.push(WireField::text("first_comment", comment.clone()));
        }
        for (field, value) in &u.fields {
            out.push(WireField::text(field.as_wire_key(), value.clone()));
        }

        match self {
            PostRequest::Text { body, .. } => {
                out.push(WireField::text("text", body.clone()));
            }
            PostRequest::Photo { title, media, .. } => {
                out.push(WireField::text("title", title.clone()));
                match media {
                    MediaList::Files(paths) => {
                        for (i, path) in paths.iter().enumerate() {
                            out.push(WireField::File {
                                name: format!("media_file[{}]", i),
                                path: path.clone(),
                            });
                        }
                    }
                    MediaList::Urls(urls) => {
                        for (i, url) in urls.iter().enumerate() {
                            out.push(WireField::text(&format!("media_url[{}]", i), url.clone()));
                        }
                    }
                }
            }
            PostRequest::Video { title, media, .. }
            | PostRequest::Document { title, media, .. } => {
                out.push(WireField::text("title", title.clone()));
                match media {
                    MediaItem::File(path) => out.push(WireField::File {
                        name: "media_file".to_string(),
                        path: path.clone(),
                    }),
                    MediaItem::Url(url) => {
                        out.push(WireField::text("media_url", url.clone()))
                    }
                }
            }
        }

        out
    }
}
