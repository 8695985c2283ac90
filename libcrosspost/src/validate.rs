//! Requirement validation
//!
//! Two gates run after parameter resolution and before the request builder:
//! the capability check (can every targeted platform receive this content
//! type) and the per-platform mandatory-field check.

use crate::error::{CrosspostError, Result};
use crate::platform::{platforms_for, ContentType, Platform};
use crate::resolve::ResolvedParams;

/// Check every targeted platform against the capability matrix.
///
/// Collects all offenders before failing so the user gets one actionable
/// message covering every violation, with the valid alternatives listed in
/// registry order.
pub fn validate_content_type(content_type: ContentType, platforms: &[Platform]) -> Result<()> {
    let unsupported: Vec<&Platform> = platforms
        .iter()
        .filter(|p| !p.supports(content_type))
        .collect();

    if unsupported.is_empty() {
        return Ok(());
    }

    let offenders = unsupported
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let alternatives = platforms_for(content_type)
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    Err(CrosspostError::InvalidInput(format!(
        "{} posts are not supported on: {}. Platforms that support {} posts: {}",
        content_type, offenders, content_type, alternatives
    )))
}

/// Check that every targeted platform's mandatory field is present in the
/// resolved parameters (flag, environment, or config default all count).
///
/// Unlike the capability check this fails on the first violation: each
/// platform's requirement is independent and the message is
/// platform-specific, naming the flag and the config key plus the file
/// that could hold it.
pub fn validate_requirements(platforms: &[Platform], resolved: &ResolvedParams) -> Result<()> {
    for platform in platforms {
        if let Some(field) = platform.requirement() {
            if resolved.field(field).is_none() {
                let config_path = crate::config::resolve_config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "the config file".to_string());
                return Err(CrosspostError::InvalidInput(format!(
                    "Posting to {} requires {}. Supply it with {} or set {} in {}",
                    platform,
                    field.as_wire_key(),
                    field.as_flag(),
                    field.as_config_key(),
                    config_path
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PlatformField;
    use std::collections::BTreeMap;

    fn resolved_with_fields(fields: &[(PlatformField, &str)]) -> ResolvedParams {
        ResolvedParams {
            profile: "default".to_string(),
            platforms: vec![Platform::X],
            timezone: chrono_tz::UTC,
            schedule_at: None,
            queue: false,
            async_upload: None,
            first_comment: None,
            fields: fields
                .iter()
                .map(|(f, v)| (*f, v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn test_text_on_supported_platforms() {
        let platforms = vec![Platform::X, Platform::Bluesky, Platform::Threads];
        assert!(validate_content_type(ContentType::Text, &platforms).is_ok());
    }

    #[test]
    fn test_text_on_instagram_names_alternatives() {
        let err = validate_content_type(ContentType::Text, &[Platform::Instagram]).unwrap_err();
        let message = format!("{}", err);
        assert!(message.contains("instagram"));
        assert!(message.contains("x, linkedin, facebook, threads, reddit, bluesky"));
    }

    #[test]
    fn test_collects_every_offender_in_one_message() {
        let platforms = vec![
            Platform::Instagram,
            Platform::X,
            Platform::Tiktok,
            Platform::Youtube,
        ];
        let err = validate_content_type(ContentType::Text, &platforms).unwrap_err();
        let message = format!("{}", err);
        assert!(message.contains("instagram"));
        assert!(message.contains("tiktok"));
        assert!(message.contains("youtube"));
        // The supported platform is not listed as an offender
        assert!(message.contains("not supported on: instagram, tiktok, youtube"));
    }

    #[test]
    fn test_photo_on_youtube_rejected() {
        let err = validate_content_type(ContentType::Photo, &[Platform::Youtube]).unwrap_err();
        assert!(format!("{}", err).contains("youtube"));
    }

    #[test]
    fn test_video_everywhere_accepted() {
        assert!(
            validate_content_type(ContentType::Video, &crate::platform::ALL_PLATFORMS).is_ok()
        );
    }

    #[test]
    fn test_document_on_non_linkedin_rejected() {
        let err =
            validate_content_type(ContentType::Document, &[Platform::Linkedin, Platform::X])
                .unwrap_err();
        let message = format!("{}", err);
        assert!(message.contains("x"));
        assert!(message.contains("linkedin"));
    }

    #[test]
    fn test_requirement_missing_facebook_page() {
        let resolved = resolved_with_fields(&[]);
        let err = validate_requirements(&[Platform::Facebook], &resolved).unwrap_err();
        let message = format!("{}", err);
        assert!(message.contains("--facebook-page"));
        assert!(message.contains("defaults.facebook.page"));
    }

    #[test]
    fn test_requirement_message_names_config_path() {
        let resolved = resolved_with_fields(&[]);
        let err = validate_requirements(&[Platform::Facebook], &resolved).unwrap_err();
        // The message points at the actual file to edit, not just the key
        assert!(format!("{}", err).contains(".toml"));
    }

    #[test]
    fn test_requirement_missing_reddit_subreddit() {
        let resolved = resolved_with_fields(&[]);
        let err = validate_requirements(&[Platform::Reddit], &resolved).unwrap_err();
        assert!(format!("{}", err).contains("--reddit-subreddit"));
    }

    #[test]
    fn test_requirement_missing_pinterest_board() {
        let resolved = resolved_with_fields(&[]);
        let err = validate_requirements(&[Platform::Pinterest], &resolved).unwrap_err();
        assert!(format!("{}", err).contains("--pinterest-board"));
    }

    #[test]
    fn test_requirement_satisfied_by_resolved_value() {
        // The resolver already merged flags and config defaults, so a value
        // from either source looks identical here.
        let resolved = resolved_with_fields(&[(PlatformField::RedditSubreddit, "rust")]);
        assert!(validate_requirements(&[Platform::Reddit], &resolved).is_ok());
    }

    #[test]
    fn test_platforms_without_requirements_pass() {
        let resolved = resolved_with_fields(&[]);
        let platforms = vec![
            Platform::X,
            Platform::Instagram,
            Platform::Linkedin,
            Platform::Tiktok,
            Platform::Threads,
            Platform::Youtube,
            Platform::Bluesky,
        ];
        assert!(validate_requirements(&platforms, &resolved).is_ok());
    }

    #[test]
    fn test_requirement_fails_fast_on_first_offender() {
        let resolved = resolved_with_fields(&[]);
        let err =
            validate_requirements(&[Platform::Facebook, Platform::Reddit], &resolved).unwrap_err();
        // Only the first missing requirement is reported
        let message = format!("{}", err);
        assert!(message.contains("facebook"));
        assert!(!message.contains("reddit"));
    }
}
