//! cross-profiles - Manage connected profiles on the upstream account

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use libcrosspost::client::CrosspostClient;
use libcrosspost::config::{self, Config};
use libcrosspost::error::{CrosspostError, Result};
use libcrosspost::resolve::{ProcessEnv, Resolver};

#[derive(Parser, Debug)]
#[command(name = "cross-profiles")]
#[command(version, about = "Manage connected profiles on the upstream account")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output format
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Config file path (default: ~/.config/crosspost/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List connected profiles
    List,
    /// Create a new profile
    Create {
        /// Profile title
        title: String,
    },
    /// Delete a profile by id
    Delete {
        /// Profile id
        profile_id: String,
    },
}

#[tokio::main]
async fn main() {
    libcrosspost::logging::init_default();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    tracing::debug!("cross-profiles started with args: {:?}", cli);

    let config = load_config(cli.config.as_ref())?;
    let env = ProcessEnv;
    let api_key = Resolver::new(&config, &env).resolve_api_key()?;
    let client = CrosspostClient::new(&api_key, &config)?;

    match cli.command {
        Command::List => {
            let profiles = client.list_profiles().await?;
            if cli.format == "json" {
                let json = serde_json::to_string_pretty(&profiles)
                    .map_err(|e| CrosspostError::InvalidInput(e.to_string()))?;
                println!("{}", json);
            } else {
                for profile in profiles {
                    println!("{} | {}", profile.id, profile.title);
                }
            }
        }
        Command::Create { title } => {
            let profile = client.create_profile(&title).await?;
            if cli.format == "json" {
                let json = serde_json::to_string_pretty(&profile)
                    .map_err(|e| CrosspostError::InvalidInput(e.to_string()))?;
                println!("{}", json);
            } else {
                println!("Created {} ({})", profile.title, profile.id);
            }
        }
        Command::Delete { profile_id } => {
            client.delete_profile(&profile_id).await?;
            println!("Deleted {}", profile_id);
        }
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
                Ok(Config::default())
            }
        }
    }
}
