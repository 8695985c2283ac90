//! cross-history - Query upstream posting history and analytics

use clap::Parser;
use std::path::PathBuf;

use libcrosspost::client::CrosspostClient;
use libcrosspost::config::{self, Config};
use libcrosspost::error::{CrosspostError, Result};
use libcrosspost::resolve::{ProcessEnv, Resolver};

#[derive(Parser, Debug)]
#[command(name = "cross-history")]
#[command(version, about = "Query posting history and per-post analytics")]
#[command(long_about = r#"Query posting history and per-post analytics.

EXAMPLES:
    # Show the last 20 posts (default)
    cross-history

    # Show more posts
    cross-history --limit 50

    # JSON output for scripting
    cross-history --format json | jq '.[] | .post_id'

    # Engagement counters for one post
    cross-history POST_ID
    cross-history POST_ID --format json

EXIT CODES:
    0 - Success (including empty results)
    1 - Transport error
    2 - Upstream rejection
    3 - Invalid input
"#)]
struct Args {
    /// Show analytics for this post instead of listing history
    post_id: Option<String>,

    /// Maximum number of posts to return
    #[arg(short, long, default_value = "20", value_name = "N")]
    limit: u32,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Config file path (default: ~/.config/crosspost/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    libcrosspost::logging::init_default();
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(args: Args) -> Result<()> {
    tracing::debug!("cross-history started with args: {:?}", args);

    let config = load_config(args.config.as_ref())?;
    let env = ProcessEnv;
    let api_key = Resolver::new(&config, &env).resolve_api_key()?;
    let client = CrosspostClient::new(&api_key, &config)?;

    match &args.post_id {
        Some(post_id) => show_analytics(&client, post_id, &args.format).await,
        None => show_history(&client, args.limit, &args.format).await,
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(p) => Config::load_from_path(p),
        None => {
            let default_path = config::resolve_config_path()?;
            if default_path.exists() {
                Config::load_from_path(&default_path)
            } else {
                Ok(Config::default())
            }
        }
    }
}

async fn show_history(client: &CrosspostClient, limit: u32, format: &str) -> Result<()> {
    let entries = client.history(limit).await?;

    if format == "json" {
        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| CrosspostError::InvalidInput(e.to_string()))?;
        println!("{}", json);
        return Ok(());
    }

    for entry in entries {
        println!(
            "{} | {} | {} | {} | {}",
            entry.created_at,
            entry.post_id,
            entry.content_type,
            entry.platforms.join(","),
            entry.status
        );
    }
    Ok(())
}

async fn show_analytics(client: &CrosspostClient, post_id: &str, format: &str) -> Result<()> {
    let report = client.analytics(post_id).await?;

    if format == "json" {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CrosspostError::InvalidInput(e.to_string()))?;
        println!("{}", json);
        return Ok(());
    }

    println!("{}", report.post_id);
    for (platform, metrics) in &report.metrics {
        println!(
            "  {}: {} impressions, {} likes, {} shares, {} comments",
            platform, metrics.impressions, metrics.likes, metrics.shares, metrics.comments
        );
    }
    Ok(())
}
