//! Parameter resolution
//!
//! Merges the four precedence layers for every logical setting:
//! explicit flag > process environment variable > persisted config value >
//! built-in default. The environment is consumed through an injected
//! [`EnvSource`] so resolution is testable with synthetic environments.
//!
//! Platform-list parsing lives here rather than in the requirement
//! validator: a bad platform name is a parse error and must be reported
//! before any content-type check runs.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::config::Config;
use crate::error::{ConfigError, CrosspostError, Result};
use crate::platform::{Platform, PlatformField, ALL_FIELDS};

/// Upper bound on how far out a post may be scheduled
pub const MAX_SCHEDULE_DAYS: i64 = 365;

/// Read-only view of the process environment
pub trait EnvSource {
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Per-invocation flags, already tokenized and typed by the CLI layer
#[derive(Debug, Clone, Default)]
pub struct Flags {
    pub profile: Option<String>,
    /// Raw comma-separated platform list
    pub platforms: Option<String>,
    pub timezone: Option<String>,
    /// Raw schedule string (RFC 3339, relative duration, or natural language)
    pub schedule: Option<String>,
    pub queue: bool,
    /// Tri-state: `None` means the caller never expressed a preference,
    /// which is distinct from an explicit `Some(false)`.
    pub async_upload: Option<bool>,
    pub first_comment: Option<String>,
    /// Explicit per-platform overrides supplied on the command line
    pub fields: BTreeMap<PlatformField, String>,
}

/// Final values after all four precedence layers
#[derive(Debug, Clone)]
pub struct ResolvedParams {
    pub profile: String,
    pub platforms: Vec<Platform>,
    pub timezone: Tz,
    pub schedule_at: Option<DateTime<Utc>>,
    pub queue: bool,
    pub async_upload: Option<bool>,
    pub first_comment: Option<String>,
    pub fields: BTreeMap<PlatformField, String>,
}

impl ResolvedParams {
    pub fn field(&self, field: PlatformField) -> Option<&str> {
        self.fields.get(&field).map(|s| s.as_str())
    }
}

pub struct Resolver<'a> {
    config: &'a Config,
    env: &'a dyn EnvSource,
}

impl<'a> Resolver<'a> {
    pub fn new(config: &'a Config, env: &'a dyn EnvSource) -> Self {
        Self { config, env }
    }

    /// Resolve every logical setting for one invocation.
    ///
    /// Fails on: both `--schedule` and `--queue` set, an unparseable or
    /// out-of-bounds schedule, an unknown timezone, an empty or invalid
    /// platform list.
    pub fn resolve(&self, flags: &Flags) -> Result<ResolvedParams> {
        if flags.schedule.is_some() && flags.queue {
            return Err(CrosspostError::InvalidInput(
                "--schedule and --queue are mutually exclusive: pick a fixed time \
                 or the next queue slot, not both"
                    .to_string(),
            ));
        }

        let profile = self
            .scalar(flags.profile.as_deref(), "CROSSPOST_PROFILE", || {
                self.config.defaults.profile.clone()
            })
            .unwrap_or_else(|| "default".to_string());

        let platforms = self.resolve_platforms(flags)?;
        let timezone = self.resolve_timezone(flags)?;

        // Timezone is resolved first so offset-less schedule strings are
        // interpreted in the caller's zone, not UTC.
        let schedule_at = match &flags.schedule {
            Some(raw) => {
                let at = parse_schedule(raw, timezone)?;
                validate_schedule_bounds(at, Utc::now())?;
                Some(at)
            }
            None => None,
        };

        let mut fields = BTreeMap::new();
        for field in ALL_FIELDS {
            let resolved = flags
                .fields
                .get(&field)
                .cloned()
                .or_else(|| self.env.var(&env_key(field)))
                .or_else(|| self.config.field_default(field).map(|s| s.to_string()));
            if let Some(value) = resolved {
                fields.insert(field, value);
            }
        }

        Ok(ResolvedParams {
            profile,
            platforms,
            timezone,
            schedule_at,
            queue: flags.queue,
            async_upload: flags.async_upload,
            first_comment: flags.first_comment.clone(),
            fields,
        })
    }

    /// Resolve the upstream API key: `CROSSPOST_API_KEY` beats the config
    /// file; there is no built-in default.
    pub fn resolve_api_key(&self) -> Result<String> {
        self.env
            .var("CROSSPOST_API_KEY")
            .or_else(|| self.config.api.key.clone())
            .ok_or_else(|| ConfigError::MissingField("api.key".to_string()).into())
    }

    fn scalar(
        &self,
        flag: Option<&str>,
        env_name: &str,
        config_value: impl FnOnce() -> Option<String>,
    ) -> Option<String> {
        flag.map(|s| s.to_string())
            .or_else(|| self.env.var(env_name))
            .or_else(config_value)
    }

    fn resolve_platforms(&self, flags: &Flags) -> Result<Vec<Platform>> {
        let raw = self.scalar(flags.platforms.as_deref(), "CROSSPOST_PLATFORMS", || {
            self.config
                .defaults
                .platforms
                .as_ref()
                .map(|v| v.join(","))
        });

        match raw {
            Some(list) => parse_platform_list(&list),
            None => Err(CrosspostError::InvalidInput(
                "No platforms specified. Use --platforms or set defaults.platforms \
                 in the config file"
                    .to_string(),
            )),
        }
    }

    fn resolve_timezone(&self, flags: &Flags) -> Result<Tz> {
        let name = self
            .scalar(flags.timezone.as_deref(), "CROSSPOST_TIMEZONE", || {
                self.config.defaults.timezone.clone()
            })
            .unwrap_or_else(|| "UTC".to_string());

        Tz::from_str(&name).map_err(|_| {
            CrosspostError::InvalidInput(format!(
                "Unknown timezone '{}'. Use an IANA name such as America/New_York",
                name
            ))
        })
    }
}

fn env_key(field: PlatformField) -> String {
    format!("CROSSPOST_{}", field.as_wire_key().to_uppercase())
}

/// Parse a comma-separated platform list: trim whitespace, drop empty
/// tokens, validate every token against the platform enumeration (reporting
/// all invalid tokens at once), and drop duplicates preserving first
/// occurrence.
pub fn parse_platform_list(raw: &str) -> Result<Vec<Platform>> {
    let mut platforms = Vec::new();
    let mut invalid = Vec::new();

    for token in raw.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        match token.parse::<Platform>() {
            Ok(p) => {
                if !platforms.contains(&p) {
                    platforms.push(p);
                }
            }
            Err(_) => invalid.push(token.to_string()),
        }
    }

    if !invalid.is_empty() {
        return Err(CrosspostError::InvalidInput(format!(
            "Unknown platform name(s): {}. Valid platforms: {}",
            invalid.join(", "),
            crate::platform::ALL_PLATFORMS
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }

    if platforms.is_empty() {
        return Err(CrosspostError::InvalidInput(
            "Platform list cannot be empty".to_string(),
        ));
    }

    Ok(platforms)
}

/// Parse a schedule string into a UTC instant
///
/// Accepts, in order of preference:
/// - RFC 3339 timestamps: "2026-09-01T15:00:00Z" (own offset wins)
/// - Relative durations: "1h", "30m", "2d"
/// - Natural language: "tomorrow", "next friday 10am", anchored in `tz`
pub fn parse_schedule(input: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CrosspostError::InvalidInput(
            "Schedule string cannot be empty".to_string(),
        ));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(std_duration) = humantime::parse_duration(input) {
        let seconds = std_duration.as_secs() as i64;
        let duration = Duration::try_seconds(seconds).ok_or_else(|| {
            CrosspostError::InvalidInput("Schedule duration out of range".to_string())
        })?;
        return Ok(Utc::now() + duration);
    }

    if let Ok(dt) = chrono_english::parse_date_string(
        input,
        Utc::now().with_timezone(&tz),
        chrono_english::Dialect::Us,
    ) {
        return Ok(dt.with_timezone(&Utc));
    }

    Err(CrosspostError::InvalidInput(format!(
        "Could not parse schedule string: {}",
        input
    )))
}

/// A schedule instant must be strictly in the future and at most
/// [`MAX_SCHEDULE_DAYS`] out. The violated bound is named in the error.
pub fn validate_schedule_bounds(at: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
    if at <= now {
        return Err(CrosspostError::InvalidInput(format!(
            "Scheduled time {} is not in the future",
            at.to_rfc3339()
        )));
    }

    let horizon = now + Duration::days(MAX_SCHEDULE_DAYS);
    if at > horizon {
        return Err(CrosspostError::InvalidInput(format!(
            "Scheduled time {} is more than {} days out",
            at.to_rfc3339(),
            MAX_SCHEDULE_DAYS
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DefaultsConfig, FacebookDefaults};
    use std::collections::HashMap;

    struct FakeEnv(HashMap<String, String>);

    impl FakeEnv {
        fn empty() -> Self {
            Self(HashMap::new())
        }

        fn with(pairs: &[(&str, &str)]) -> Self {
            Self(
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            )
        }
    }

    impl EnvSource for FakeEnv {
        fn var(&self, name: &str) -> Option<String> {
            self.0.get(name).cloned()
        }
    }

    fn config_with_defaults() -> Config {
        Config {
            defaults: DefaultsConfig {
                profile: Some("config-profile".to_string()),
                platforms: Some(vec!["x".to_string(), "bluesky".to_string()]),
                timezone: Some("Europe/Berlin".to_string()),
                facebook: Some(FacebookDefaults {
                    page: Some("config-page".to_string()),
                }),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn flags_with_platforms() -> Flags {
        Flags {
            platforms: Some("x".to_string()),
            ..Default::default()
        }
    }

    // PRECEDENCE

    #[test]
    fn test_precedence_flag_beats_everything() {
        let config = config_with_defaults();
        let env = FakeEnv::with(&[("CROSSPOST_PROFILE", "env-profile")]);
        let resolver = Resolver::new(&config, &env);

        let flags = Flags {
            profile: Some("flag-profile".to_string()),
            ..flags_with_platforms()
        };
        let resolved = resolver.resolve(&flags).unwrap();
        assert_eq!(resolved.profile, "flag-profile");
    }

    #[test]
    fn test_precedence_env_beats_config() {
        let config = config_with_defaults();
        let env = FakeEnv::with(&[("CROSSPOST_PROFILE", "env-profile")]);
        let resolver = Resolver::new(&config, &env);

        let resolved = resolver.resolve(&flags_with_platforms()).unwrap();
        assert_eq!(resolved.profile, "env-profile");
    }

    #[test]
    fn test_precedence_config_beats_builtin() {
        let config = config_with_defaults();
        let env = FakeEnv::empty();
        let resolver = Resolver::new(&config, &env);

        let resolved = resolver.resolve(&flags_with_platforms()).unwrap();
        assert_eq!(resolved.profile, "config-profile");
    }

    #[test]
    fn test_precedence_builtin_default() {
        let config = Config::default();
        let env = FakeEnv::empty();
        let resolver = Resolver::new(&config, &env);

        let resolved = resolver.resolve(&flags_with_platforms()).unwrap();
        assert_eq!(resolved.profile, "default");
        assert_eq!(resolved.timezone, chrono_tz::UTC);
    }

    #[test]
    fn test_precedence_for_platform_fields() {
        let config = config_with_defaults();
        let env = FakeEnv::with(&[("CROSSPOST_FACEBOOK_PAGE", "env-page")]);
        let resolver = Resolver::new(&config, &env);

        // flag wins
        let mut flags = flags_with_platforms();
        flags
            .fields
            .insert(PlatformField::FacebookPage, "flag-page".to_string());
        let resolved = resolver.resolve(&flags).unwrap();
        assert_eq!(resolved.field(PlatformField::FacebookPage), Some("flag-page"));

        // then env
        let resolved = resolver.resolve(&flags_with_platforms()).unwrap();
        assert_eq!(resolved.field(PlatformField::FacebookPage), Some("env-page"));

        // then config
        let env = FakeEnv::empty();
        let resolver = Resolver::new(&config, &env);
        let resolved = resolver.resolve(&flags_with_platforms()).unwrap();
        assert_eq!(
            resolved.field(PlatformField::FacebookPage),
            Some("config-page")
        );

        // then absent
        let config = Config::default();
        let resolver = Resolver::new(&config, &env);
        let resolved = resolver.resolve(&flags_with_platforms()).unwrap();
        assert_eq!(resolved.field(PlatformField::FacebookPage), None);
    }

    // PLATFORM LIST PARSING

    #[test]
    fn test_parse_platform_list_trims_and_drops_empty() {
        let platforms = parse_platform_list(" x , bluesky ,, threads ").unwrap();
        assert_eq!(
            platforms,
            vec![Platform::X, Platform::Bluesky, Platform::Threads]
        );
    }

    #[test]
    fn test_parse_platform_list_reports_all_invalid_tokens() {
        let err = parse_platform_list("x,mastodon,nostr,bluesky").unwrap_err();
        let message = format!("{}", err);
        assert!(message.contains("mastodon"));
        assert!(message.contains("nostr"));
        assert!(message.contains("Valid platforms"));
    }

    #[test]
    fn test_parse_platform_list_dedups() {
        let platforms = parse_platform_list("x,x,bluesky,x").unwrap();
        assert_eq!(platforms, vec![Platform::X, Platform::Bluesky]);
    }

    #[test]
    fn test_parse_platform_list_empty_fails() {
        assert!(parse_platform_list("").is_err());
        assert!(parse_platform_list(" , ,").is_err());
    }

    #[test]
    fn test_resolve_no_platforms_anywhere_fails() {
        let config = Config::default();
        let env = FakeEnv::empty();
        let resolver = Resolver::new(&config, &env);

        let err = resolver.resolve(&Flags::default()).unwrap_err();
        assert!(format!("{}", err).contains("No platforms specified"));
    }

    #[test]
    fn test_resolve_platforms_from_env() {
        let config = Config::default();
        let env = FakeEnv::with(&[("CROSSPOST_PLATFORMS", "threads,reddit")]);
        let resolver = Resolver::new(&config, &env);

        let resolved = resolver.resolve(&Flags::default()).unwrap();
        assert_eq!(resolved.platforms, vec![Platform::Threads, Platform::Reddit]);
    }

    // SCHEDULE / QUEUE

    #[test]
    fn test_schedule_and_queue_mutually_exclusive() {
        let config = Config::default();
        let env = FakeEnv::empty();
        let resolver = Resolver::new(&config, &env);

        let flags = Flags {
            schedule: Some("1h".to_string()),
            queue: true,
            ..flags_with_platforms()
        };
        let err = resolver.resolve(&flags).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(format!("{}", err).contains("mutually exclusive"));
    }

    #[test]
    fn test_schedule_rfc3339() {
        let at = parse_schedule("2030-06-01T12:00:00Z", chrono_tz::UTC).unwrap();
        assert_eq!(at.to_rfc3339(), "2030-06-01T12:00:00+00:00");
    }

    #[test]
    fn test_schedule_rfc3339_own_offset_wins() {
        // An explicit offset in the input beats the resolved timezone
        let at = parse_schedule("2030-06-01T12:00:00+02:00", chrono_tz::Asia::Tokyo).unwrap();
        assert_eq!(at.to_rfc3339(), "2030-06-01T10:00:00+00:00");
    }

    #[test]
    fn test_schedule_relative_duration() {
        let at = parse_schedule("2h", chrono_tz::UTC).unwrap();
        let minutes = (at - Utc::now()).num_minutes();
        assert!((119..=121).contains(&minutes), "got {} minutes", minutes);
    }

    #[test]
    fn test_schedule_natural_language() {
        let result = parse_schedule("tomorrow", chrono_tz::UTC);
        assert!(result.is_ok());
    }

    #[test]
    fn test_schedule_natural_language_anchored_in_timezone() {
        // 9am local is a different instant in different zones; the two
        // "tomorrow"s may also fall on different calendar days, so compare
        // the offset modulo a day.
        let tokyo = parse_schedule("tomorrow 9am", chrono_tz::Asia::Tokyo).unwrap();
        let new_york = parse_schedule("tomorrow 9am", chrono_tz::America::New_York).unwrap();
        assert_ne!(tokyo, new_york);
        let hours = (new_york - tokyo).num_hours() % 24;
        assert!((12..=15).contains(&hours), "got {} hours apart", hours);
    }

    #[test]
    fn test_schedule_unparseable() {
        assert!(parse_schedule("not a time", chrono_tz::UTC).is_err());
        assert!(parse_schedule("", chrono_tz::UTC).is_err());
    }

    #[test]
    fn test_schedule_bounds_now_fails() {
        let now = Utc::now();
        let err = validate_schedule_bounds(now, now).unwrap_err();
        assert!(format!("{}", err).contains("not in the future"));
    }

    #[test]
    fn test_schedule_bounds_one_second_out_succeeds() {
        let now = Utc::now();
        assert!(validate_schedule_bounds(now + Duration::seconds(1), now).is_ok());
    }

    #[test]
    fn test_schedule_bounds_364_days_succeeds() {
        let now = Utc::now();
        assert!(validate_schedule_bounds(now + Duration::days(364), now).is_ok());
    }

    #[test]
    fn test_schedule_bounds_past_365_days_fails() {
        let now = Utc::now();
        let err =
            validate_schedule_bounds(now + Duration::days(365) + Duration::seconds(1), now)
                .unwrap_err();
        assert!(format!("{}", err).contains("365 days"));
    }

    // TIMEZONE

    #[test]
    fn test_timezone_valid_iana_name() {
        let config = Config::default();
        let env = FakeEnv::empty();
        let resolver = Resolver::new(&config, &env);

        let flags = Flags {
            timezone: Some("America/New_York".to_string()),
            ..flags_with_platforms()
        };
        let resolved = resolver.resolve(&flags).unwrap();
        assert_eq!(resolved.timezone, chrono_tz::America::New_York);
    }

    #[test]
    fn test_timezone_flag_shifts_natural_language_schedule() {
        let config = Config::default();
        let env = FakeEnv::empty();
        let resolver = Resolver::new(&config, &env);

        let schedule_in = |tz: &str| {
            let flags = Flags {
                timezone: Some(tz.to_string()),
                schedule: Some("tomorrow 9am".to_string()),
                ..flags_with_platforms()
            };
            resolver.resolve(&flags).unwrap().schedule_at.unwrap()
        };
        assert_ne!(schedule_in("Asia/Tokyo"), schedule_in("America/New_York"));
    }

    #[test]
    fn test_timezone_invalid_name_fails() {
        let config = Config::default();
        let env = FakeEnv::empty();
        let resolver = Resolver::new(&config, &env);

        let flags = Flags {
            timezone: Some("Mars/Olympus_Mons".to_string()),
            ..flags_with_platforms()
        };
        let err = resolver.resolve(&flags).unwrap_err();
        assert!(format!("{}", err).contains("Unknown timezone"));
    }

    // ASYNC FLAG

    #[test]
    fn test_async_flag_stays_tri_state() {
        let config = Config::default();
        let env = FakeEnv::empty();
        let resolver = Resolver::new(&config, &env);

        let resolved = resolver.resolve(&flags_with_platforms()).unwrap();
        assert_eq!(resolved.async_upload, None);

        let flags = Flags {
            async_upload: Some(false),
            ..flags_with_platforms()
        };
        let resolved = resolver.resolve(&flags).unwrap();
        assert_eq!(resolved.async_upload, Some(false));
    }

    // API KEY

    #[test]
    fn test_api_key_env_beats_config() {
        let mut config = Config::default();
        config.api.key = Some("config-key".to_string());
        let env = FakeEnv::with(&[("CROSSPOST_API_KEY", "env-key")]);
        let resolver = Resolver::new(&config, &env);
        assert_eq!(resolver.resolve_api_key().unwrap(), "env-key");
    }

    #[test]
    fn test_api_key_missing_everywhere_fails() {
        let config = Config::default();
        let env = FakeEnv::empty();
        let resolver = Resolver::new(&config, &env);
        assert!(resolver.resolve_api_key().is_err());
    }
}
