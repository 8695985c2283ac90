//! cross-post - Post content to social platforms through one upstream API

use clap::{ArgAction, Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;

use libcrosspost::client::{CrosspostClient, PollOptions, PollOutcome};
use libcrosspost::config::{self, Config};
use libcrosspost::error::{CrosspostError, Result};
use libcrosspost::outcome::{PlatformResult, PostOutcome};
use libcrosspost::platform::PlatformField;
use libcrosspost::request::{self, ContentInput};
use libcrosspost::resolve::{Flags, ProcessEnv, Resolver};
use libcrosspost::validate;

#[derive(Parser, Debug)]
#[command(name = "cross-post")]
#[command(version, about = "Post content to social platforms through one upstream API")]
#[command(long_about = r#"Post text, photos, videos, and documents to up to ten social
platforms in one invocation.

EXAMPLES:
    # Text post to two platforms
    cross-post text "Shipped v2.0 today" --platforms x,bluesky

    # Text from stdin
    echo "Hello" | cross-post text --platforms threads

    # Photo carousel, scheduled for later
    cross-post photo --title "Launch day" --file a.jpg --file b.jpg \
        --platforms instagram,pinterest --pinterest-board launches \
        --schedule "tomorrow 9am"

    # Video upload (large files upgrade to async automatically)
    cross-post video --title "Demo" --file demo.mp4 --platforms youtube,tiktok

    # Document to linkedin
    cross-post document --title "Q3 report" --file report.pdf --platforms linkedin

    # Preview the request without sending anything
    cross-post text "draft" --platforms x --dry-run

EXIT CODES:
    0 - Success (including partial platform failure)
    1 - Transport error (timeout, connection, unparseable response)
    2 - Upstream rejection (auth, quota, platform errors)
    3 - Invalid input (caught before any network call)
"#)]
struct Cli {
    #[command(subcommand)]
    content: Content,
}

#[derive(Subcommand, Debug)]
enum Content {
    /// Post plain text
    Text {
        /// Text to post (reads --file, then stdin, if not provided)
        body: Option<String>,

        /// Read the post body from a file
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Post one or more photos
    Photo {
        /// Post title
        #[arg(long)]
        title: String,

        /// Local image file (repeat for a carousel)
        #[arg(long = "file", value_name = "PATH")]
        files: Vec<PathBuf>,

        /// Remote image URL (repeat for a carousel)
        #[arg(long = "url", value_name = "URL")]
        urls: Vec<String>,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Post a video
    Video {
        /// Post title
        #[arg(long)]
        title: String,

        /// Local video file
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Remote video URL
        #[arg(long, value_name = "URL")]
        url: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Post a document (linkedin only)
    Document {
        /// Post title
        #[arg(long)]
        title: String,

        /// Local document file
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Remote document URL
        #[arg(long, value_name = "URL")]
        url: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Target platforms (comma-separated)
    #[arg(short, long, value_name = "LIST")]
    platforms: Option<String>,

    /// Upstream profile to post as
    #[arg(long)]
    profile: Option<String>,

    /// IANA timezone for schedule interpretation
    #[arg(long, value_name = "TZ")]
    timezone: Option<String>,

    /// Schedule for later: RFC 3339, a duration ("2h"), or natural language
    #[arg(long, value_name = "WHEN")]
    schedule: Option<String>,

    /// Add to the profile's posting queue instead of posting now
    #[arg(long)]
    queue: bool,

    /// Force asynchronous upload on or off (default: decided by file size)
    #[arg(
        long = "async",
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    async_upload: Option<bool>,

    /// Text posted as the first comment under the post
    #[arg(long, value_name = "TEXT")]
    first_comment: Option<String>,

    // Per-platform options
    /// X: post as a long-form article ("true"/"false")
    #[arg(long, value_name = "VALUE")]
    x_long_form: Option<String>,

    /// Instagram: location tag
    #[arg(long, value_name = "VALUE")]
    instagram_location: Option<String>,

    /// LinkedIn: post visibility (public, connections)
    #[arg(long, value_name = "VALUE")]
    linkedin_visibility: Option<String>,

    /// Facebook: page id to post to (required when targeting facebook)
    #[arg(long, value_name = "ID")]
    facebook_page: Option<String>,

    /// TikTok: privacy level (public, friends, private)
    #[arg(long, value_name = "VALUE")]
    tiktok_privacy: Option<String>,

    /// Threads: who may reply (everyone, followers, mentioned)
    #[arg(long, value_name = "VALUE")]
    threads_reply_control: Option<String>,

    /// YouTube: visibility (public, unlisted, private)
    #[arg(long, value_name = "VALUE")]
    youtube_visibility: Option<String>,

    /// YouTube: comma-separated video tags
    #[arg(long, value_name = "LIST")]
    youtube_tags: Option<String>,

    /// Reddit: subreddit to post in (required when targeting reddit)
    #[arg(long, value_name = "NAME")]
    reddit_subreddit: Option<String>,

    /// Reddit: post flair
    #[arg(long, value_name = "VALUE")]
    reddit_flair: Option<String>,

    /// Pinterest: board to pin to (required when targeting pinterest)
    #[arg(long, value_name = "NAME")]
    pinterest_board: Option<String>,

    /// Pinterest: destination link for the pin
    #[arg(long, value_name = "URL")]
    pinterest_link: Option<String>,

    /// Bluesky: comma-separated post languages
    #[arg(long, value_name = "LIST")]
    bluesky_languages: Option<String>,

    /// Config file path (default: ~/.config/crosspost/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the built request as JSON and exit without sending
    #[arg(long)]
    dry_run: bool,

    /// Poll an async upload until it finishes
    #[arg(long)]
    wait: bool,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl CommonArgs {
    fn field_overrides(&self) -> BTreeMap<PlatformField, String> {
        let pairs = [
            (PlatformField::XLongForm, &self.x_long_form),
            (PlatformField::InstagramLocation, &self.instagram_location),
            (PlatformField::LinkedinVisibility, &self.linkedin_visibility),
            (PlatformField::FacebookPage, &self.facebook_page),
            (PlatformField::TiktokPrivacy, &self.tiktok_privacy),
            (PlatformField::ThreadsReplyControl, &self.threads_reply_control),
            (PlatformField::YoutubeVisibility, &self.youtube_visibility),
            (PlatformField::YoutubeTags, &self.youtube_tags),
            (PlatformField::RedditSubreddit, &self.reddit_subreddit),
            (PlatformField::RedditFlair, &self.reddit_flair),
            (PlatformField::PinterestBoard, &self.pinterest_board),
            (PlatformField::PinterestLink, &self.pinterest_link),
            (PlatformField::BlueskyLanguages, &self.bluesky_languages),
        ];
        pairs
            .into_iter()
            .filter_map(|(field, value)| value.clone().map(|v| (field, v)))
            .collect()
    }

    fn to_flags(&self) -> Flags {
        Flags {
            profile: self.profile.clone(),
            platforms: self.platforms.clone(),
            timezone: self.timezone.clone(),
            schedule: self.schedule.clone(),
            queue: self.queue,
            async_upload: self.async_upload,
            first_comment: self.first_comment.clone(),
            fields: self.field_overrides(),
        }
    }
}

impl Content {
    fn common(&self) -> &CommonArgs {
        match self {
            Content::Text { common, .. }
            | Content::Photo { common, .. }
            | Content::Video { common, .. }
            | Content::Document { common, .. } => common,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let common = cli.content.common();
    libcrosspost::logging::LoggingConfig::new(
        libcrosspost::logging::LogFormat::Text,
        "warn".to_string(),
        common.verbose,
    )
    .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    tracing::debug!("cross-post started with args: {:?}", cli);

    let common = cli.content.common();
    let config = load_config(common.config.as_ref())?;
    let env = ProcessEnv;
    let resolver = Resolver::new(&config, &env);

    let resolved = resolver.resolve(&common.to_flags())?;
    let input = content_input(&cli.content)?;

    validate::validate_content_type(input.content_type(), &resolved.platforms)?;
    validate::validate_requirements(&resolved.platforms, &resolved)?;

    let request = request::build(input, &resolved)?;

    if common.dry_run {
        let json = serde_json::to_string_pretty(&request)
            .map_err(|e| CrosspostError::InvalidInput(e.to_string()))?;
        println!("{}", json);
        return Ok(());
    }

    let api_key = resolver.resolve_api_key()?;
    let client = CrosspostClient::new(&api_key, &config)?;
    let outcome = client.post(request).await?;

    if let (PostOutcome::AsyncQueued { request_id }, true) = (&outcome, common.wait) {
        let poll = client
            .poll_status(request_id, PollOptions::default())
            .await?;
        print_poll_outcome(&poll, &common.format)?;
        return match poll {
            PollOutcome::Completed { results }
                if results
                    .values()
                    .any(|r| matches!(r, PlatformResult::Success { .. })) =>
            {
                Ok(())
            }
            _ => {
                std::process::exit(2);
            }
        };
    }

    print_outcome(&outcome, &common.format)?;
    if !outcome.succeeded() {
        // Every targeted platform rejected the post
        std::process::exit(2);
    }
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(p) => Config::load_from_path(p),
        None => {
            let default_path = config::resolve_config_path()?;
            if default_path.exists() {
                Config::load_from_path(&default_path)
            } else {
                // No config file is fine; flags and env must carry the day
                Ok(Config::default())
            }
        }
    }
}

fn content_input(content: &Content) -> Result<ContentInput> {
    match content {
        Content::Text { body, file, .. } => {
            let body = text_body(body.as_deref(), file.as_deref())?;
            Ok(ContentInput::Text { body })
        }
        Content::Photo {
            title, files, urls, ..
        } => Ok(ContentInput::Photo {
            title: title.clone(),
            files: files.clone(),
            urls: urls.clone(),
        }),
        Content::Video {
            title, file, url, ..
        } => Ok(ContentInput::Video {
            title: title.clone(),
            file: file.clone(),
            url: url.clone(),
        }),
        Content::Document {
            title, file, url, ..
        } => Ok(ContentInput::Document {
            title: title.clone(),
            file: file.clone(),
            url: url.clone(),
        }),
    }
}

/// Pick the text source: inline argument, then --file, then stdin
fn text_body(inline: Option<&str>, file: Option<&std::path::Path>) -> Result<String> {
    if let Some(body) = inline {
        return Ok(body.to_string());
    }
    if let Some(path) = file {
        return std::fs::read_to_string(path).map_err(|e| {
            CrosspostError::InvalidInput(format!("Failed to read {}: {}", path.display(), e))
        });
    }

    let mut body = String::new();
    std::io::stdin()
        .read_to_string(&mut body)
        .map_err(|e| CrosspostError::InvalidInput(format!("Failed to read stdin: {}", e)))?;
    Ok(body.trim_end_matches('\n').to_string())
}

fn print_outcome(outcome: &PostOutcome, format: &str) -> Result<()> {
    if format == "json" {
        let json = serde_json::to_string_pretty(outcome)
            .map_err(|e| CrosspostError::InvalidInput(e.to_string()))?;
        println!("{}", json);
        return Ok(());
    }

    match outcome {
        PostOutcome::Scheduled {
            post_id,
            scheduled_for,
        } => {
            println!("Scheduled {} for {}", post_id, scheduled_for.to_rfc3339());
        }
        PostOutcome::AsyncQueued { request_id } => {
            println!("Accepted for processing: {}", request_id);
            println!("Re-run with --wait to poll until it finishes");
        }
        PostOutcome::Immediate { results } => {
            for (platform, result) in results {
                match result {
                    PlatformResult::Success { url, .. } => {
                        println!("✓ {}: {}", platform, url);
                    }
                    PlatformResult::Failure { error } => {
                        println!("✗ {}: {}", platform, error);
                    }
                }
            }
        }
    }
    Ok(())
}

fn print_poll_outcome(poll: &PollOutcome, format: &str) -> Result<()> {
    if format == "json" {
        let json = serde_json::to_string_pretty(poll)
            .map_err(|e| CrosspostError::InvalidInput(e.to_string()))?;
        println!("{}", json);
        return Ok(());
    }

    match poll {
        PollOutcome::Completed { results } => {
            for (platform, result) in results {
                match result {
                    PlatformResult::Success { url, .. } => {
                        println!("✓ {}: {}", platform, url);
                    }
                    PlatformResult::Failure { error } => {
                        println!("✗ {}: {}", platform, error);
                    }
                }
            }
        }
        PollOutcome::Failed { error } => {
            println!("✗ delivery failed: {}", error);
        }
        PollOutcome::Exhausted { last_status } => {
            println!("Still {}: re-run with --wait to keep polling", last_status);
        }
    }
    Ok(())
}
