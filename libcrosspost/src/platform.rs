//! Platform registry: the ten supported destinations, the content types
//! each accepts, and the closed set of per-platform override fields.
//!
//! The registry is static data, initialized once per process and read-only
//! afterwards. Lookup order is the canonical enumeration order below, which
//! is also the order used when listing valid alternatives in error messages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical platform enumeration order
pub const ALL_PLATFORMS: [Platform; 10] = [
    Platform::X,
    Platform::Instagram,
    Platform::Linkedin,
    Platform::Facebook,
    Platform::Tiktok,
    Platform::Threads,
    Platform::Youtube,
    Platform::Reddit,
    Platform::Pinterest,
    Platform::Bluesky,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    X,
    Instagram,
    Linkedin,
    Facebook,
    Tiktok,
    Threads,
    Youtube,
    Reddit,
    Pinterest,
    Bluesky,
}

impl Platform {
    /// The lowercase wire identifier for this platform
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::X => "x",
            Platform::Instagram => "instagram",
            Platform::Linkedin => "linkedin",
            Platform::Facebook => "facebook",
            Platform::Tiktok => "tiktok",
            Platform::Threads => "threads",
            Platform::Youtube => "youtube",
            Platform::Reddit => "reddit",
            Platform::Pinterest => "pinterest",
            Platform::Bluesky => "bluesky",
        }
    }

    /// Whether this platform accepts the given content type
    pub fn supports(&self, content_type: ContentType) -> bool {
        match content_type {
            ContentType::Text => matches!(
                self,
                Platform::X
                    | Platform::Linkedin
                    | Platform::Facebook
                    | Platform::Threads
                    | Platform::Reddit
                    | Platform::Bluesky
            ),
            ContentType::Photo => !matches!(self, Platform::Youtube),
            ContentType::Video => true,
            ContentType::Document => matches!(self, Platform::Linkedin),
        }
    }

    /// The field that must be present whenever this platform is targeted,
    /// if it has one (facebook needs a page, pinterest a board, reddit a
    /// subreddit).
    pub fn requirement(&self) -> Option<PlatformField> {
        match self {
            Platform::Facebook => Some(PlatformField::FacebookPage),
            Platform::Pinterest => Some(PlatformField::PinterestBoard),
            Platform::Reddit => Some(PlatformField::RedditSubreddit),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x" | "twitter" => Ok(Platform::X),
            "instagram" => Ok(Platform::Instagram),
            "linkedin" => Ok(Platform::Linkedin),
            "facebook" => Ok(Platform::Facebook),
            "tiktok" => Ok(Platform::Tiktok),
            "threads" => Ok(Platform::Threads),
            "youtube" => Ok(Platform::Youtube),
            "reddit" => Ok(Platform::Reddit),
            "pinterest" => Ok(Platform::Pinterest),
            "bluesky" => Ok(Platform::Bluesky),
            _ => Err(format!("Unknown platform: '{}'", s)),
        }
    }
}

/// The medium of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Photo,
    Video,
    Document,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Photo => "photo",
            ContentType::Video => "video",
            ContentType::Document => "document",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Platforms that accept the given content type, in canonical order
pub fn platforms_for(content_type: ContentType) -> Vec<Platform> {
    ALL_PLATFORMS
        .iter()
        .copied()
        .filter(|p| p.supports(content_type))
        .collect()
}

/// Every platform-specific override field
///
/// Kept in sync with [`PlatformField::as_wire_key`]; fields not listed here
/// cannot be attached to a request, so an unknown key is unrepresentable
/// rather than silently dropped.
pub const ALL_FIELDS: [PlatformField; 13] = [
    PlatformField::XLongForm,
    PlatformField::InstagramLocation,
    PlatformField::LinkedinVisibility,
    PlatformField::FacebookPage,
    PlatformField::TiktokPrivacy,
    PlatformField::ThreadsReplyControl,
    PlatformField::YoutubeVisibility,
    PlatformField::YoutubeTags,
    PlatformField::RedditSubreddit,
    PlatformField::RedditFlair,
    PlatformField::PinterestBoard,
    PlatformField::PinterestLink,
    PlatformField::BlueskyLanguages,
];

/// A platform-specific override field, prefixed on the wire by its owning
/// platform (e.g. `linkedin_visibility`, `tiktok_privacy`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformField {
    XLongForm,
    InstagramLocation,
    LinkedinVisibility,
    FacebookPage,
    TiktokPrivacy,
    ThreadsReplyControl,
    YoutubeVisibility,
    YoutubeTags,
    RedditSubreddit,
    RedditFlair,
    PinterestBoard,
    PinterestLink,
    BlueskyLanguages,
}

impl PlatformField {
    /// The platform this field belongs to
    pub fn owner(&self) -> Platform {
        match self {
            PlatformField::XLongForm => Platform::X,
            PlatformField::InstagramLocation => Platform::Instagram,
            PlatformField::LinkedinVisibility => Platform::Linkedin,
            PlatformField::FacebookPage => Platform::Facebook,
            PlatformField::TiktokPrivacy => Platform::Tiktok,
            PlatformField::ThreadsReplyControl => Platform::Threads,
            PlatformField::YoutubeVisibility | PlatformField::YoutubeTags => Platform::Youtube,
            PlatformField::RedditSubreddit | PlatformField::RedditFlair => Platform::Reddit,
            PlatformField::PinterestBoard | PlatformField::PinterestLink => Platform::Pinterest,
            PlatformField::BlueskyLanguages => Platform::Bluesky,
        }
    }

    /// The multipart field name this value is sent under
    pub fn as_wire_key(&self) -> &'static str {
        match self {
            PlatformField::XLongForm => "x_long_form",
            PlatformField::InstagramLocation => "instagram_location",
            PlatformField::LinkedinVisibility => "linkedin_visibility",
            PlatformField::FacebookPage => "facebook_page",
            PlatformField::TiktokPrivacy => "tiktok_privacy",
            PlatformField::ThreadsReplyControl => "threads_reply_control",
            PlatformField::YoutubeVisibility => "youtube_visibility",
            PlatformField::YoutubeTags => "youtube_tags",
            PlatformField::RedditSubreddit => "reddit_subreddit",
            PlatformField::RedditFlair => "reddit_flair",
            PlatformField::PinterestBoard => "pinterest_board",
            PlatformField::PinterestLink => "pinterest_link",
            PlatformField::BlueskyLanguages => "bluesky_languages",
        }
    }

    /// The CLI flag that supplies this field
    pub fn as_flag(&self) -> &'static str {
        match self {
            PlatformField::XLongForm => "--x-long-form",
            PlatformField::InstagramLocation => "--instagram-location",
            PlatformField::LinkedinVisibility => "--linkedin-visibility",
            PlatformField::FacebookPage => "--facebook-page",
            PlatformField::TiktokPrivacy => "--tiktok-privacy",
            PlatformField::ThreadsReplyControl => "--threads-reply-control",
            PlatformField::YoutubeVisibility => "--youtube-visibility",
            PlatformField::YoutubeTags => "--youtube-tags",
            PlatformField::RedditSubreddit => "--reddit-subreddit",
            PlatformField::RedditFlair => "--reddit-flair",
            PlatformField::PinterestBoard => "--pinterest-board",
            PlatformField::PinterestLink => "--pinterest-link",
            PlatformField::BlueskyLanguages => "--bluesky-languages",
        }
    }

    /// The config-file key that can supply a persisted default
    pub fn as_config_key(&self) -> &'static str {
        match self {
            PlatformField::XLongForm => "defaults.x.long_form",
            PlatformField::InstagramLocation => "defaults.instagram.location",
            PlatformField::LinkedinVisibility => "defaults.linkedin.visibility",
            PlatformField::FacebookPage => "defaults.facebook.page",
            PlatformField::TiktokPrivacy => "defaults.tiktok.privacy",
            PlatformField::ThreadsReplyControl => "defaults.threads.reply_control",
            PlatformField::YoutubeVisibility => "defaults.youtube.visibility",
            PlatformField::YoutubeTags => "defaults.youtube.tags",
            PlatformField::RedditSubreddit => "defaults.reddit.subreddit",
            PlatformField::RedditFlair => "defaults.reddit.flair",
            PlatformField::PinterestBoard => "defaults.pinterest.board",
            PlatformField::PinterestLink => "defaults.pinterest.link",
            PlatformField::BlueskyLanguages => "defaults.bluesky.languages",
        }
    }
}

impl fmt::Display for PlatformField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_wire_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_platform_supports_something() {
        for platform in ALL_PLATFORMS {
            let supported = [
                ContentType::Text,
                ContentType::Photo,
                ContentType::Video,
                ContentType::Document,
            ]
            .iter()
            .any(|ct| platform.supports(*ct));
            assert!(supported, "{} supports no content type", platform);
        }
    }

    #[test]
    fn test_document_is_linkedin_only() {
        for platform in ALL_PLATFORMS {
            assert_eq!(
                platform.supports(ContentType::Document),
                platform == Platform::Linkedin
            );
        }
        assert_eq!(
            platforms_for(ContentType::Document),
            vec![Platform::Linkedin]
        );
    }

    #[test]
    fn test_text_capable_platforms_in_registry_order() {
        assert_eq!(
            platforms_for(ContentType::Text),
            vec![
                Platform::X,
                Platform::Linkedin,
                Platform::Facebook,
                Platform::Threads,
                Platform::Reddit,
                Platform::Bluesky,
            ]
        );
    }

    #[test]
    fn test_photo_excludes_only_youtube() {
        let photo = platforms_for(ContentType::Photo);
        assert_eq!(photo.len(), 9);
        assert!(!photo.contains(&Platform::Youtube));
    }

    #[test]
    fn test_video_supported_everywhere() {
        assert_eq!(platforms_for(ContentType::Video).len(), 10);
    }

    #[test]
    fn test_platform_from_str_round_trip() {
        for platform in ALL_PLATFORMS {
            let parsed: Platform = platform.as_str().parse().unwrap();
            assert_eq!(parsed, platform);
        }
    }

    #[test]
    fn test_platform_from_str_case_insensitive() {
        assert_eq!("TikTok".parse::<Platform>().unwrap(), Platform::Tiktok);
        assert_eq!("LINKEDIN".parse::<Platform>().unwrap(), Platform::Linkedin);
    }

    #[test]
    fn test_platform_from_str_twitter_alias() {
        assert_eq!("twitter".parse::<Platform>().unwrap(), Platform::X);
    }

    #[test]
    fn test_platform_from_str_unknown() {
        let result = "mastodon".parse::<Platform>();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("mastodon"));
    }

    #[test]
    fn test_requirements_table() {
        assert_eq!(
            Platform::Facebook.requirement(),
            Some(PlatformField::FacebookPage)
        );
        assert_eq!(
            Platform::Pinterest.requirement(),
            Some(PlatformField::PinterestBoard)
        );
        assert_eq!(
            Platform::Reddit.requirement(),
            Some(PlatformField::RedditSubreddit)
        );
        assert_eq!(Platform::X.requirement(), None);
        assert_eq!(Platform::Linkedin.requirement(), None);
    }

    #[test]
    fn test_field_wire_keys_are_platform_prefixed() {
        for field in ALL_FIELDS {
            assert!(
                field.as_wire_key().starts_with(field.owner().as_str()),
                "{} is not prefixed by {}",
                field.as_wire_key(),
                field.owner()
            );
        }
    }

    #[test]
    fn test_field_flags_match_wire_keys() {
        for field in ALL_FIELDS {
            let expected = format!("--{}", field.as_wire_key().replace('_', "-"));
            assert_eq!(field.as_flag(), expected);
        }
    }

    #[test]
    fn test_field_serde_matches_wire_key() {
        for field in ALL_FIELDS {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!(r#""{}""#, field.as_wire_key()));
        }
    }

    #[test]
    fn test_platform_serde_lowercase() {
        let json = serde_json::to_string(&Platform::Bluesky).unwrap();
        assert_eq!(json, r#""bluesky""#);
        let back: Platform = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Platform::Bluesky);
    }

    #[test]
    fn test_content_type_display() {
        assert_eq!(ContentType::Text.to_string(), "text");
        assert_eq!(ContentType::Document.to_string(), "document");
    }
}
