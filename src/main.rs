use std::fs;
use std::io::{self, Read};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{debug, info};

use subingest::settings::update_settings_from_file;
use subingest::store::{JsonFileStore, ProfileStore};
use subingest::sync::SyncOptions;
use subingest::utils::ReqwestFetcher;
use subingest::{ConfigManager, Settings};

/// Import proxy descriptors and subscription feeds into a profile store
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSON profile store
    #[arg(short, long, value_name = "FILE", default_value = "profiles.json")]
    store: String,

    /// Path to the TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import descriptors, custom configs or subscription URLs from a file ("-" for stdin)
    Import {
        #[arg(value_name = "FILE")]
        input: String,

        /// Owning subscription id
        #[arg(long, value_name = "ID", default_value = "")]
        sub: String,

        /// Keep the subscription's existing profiles
        #[arg(long)]
        append: bool,
    },
    /// Refresh one subscription, or all of them
    Sync {
        #[arg(value_name = "ID")]
        id: Option<String>,
    },
    /// Print the share URI of a profile
    Share {
        #[arg(value_name = "PROFILE_ID")]
        id: String,
    },
    /// Print share URIs of every shareable profile
    Export,
    /// List stored profiles and subscriptions
    List,
    /// Mark a profile as selected
    Select {
        #[arg(value_name = "PROFILE_ID")]
        id: String,
    },
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read stdin")?;
        Ok(content)
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read '{}'", input))
    }
}

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let args = Args::parse();

    if let Some(config) = args.config.as_deref() {
        update_settings_from_file(config)
            .with_context(|| format!("Failed to load settings from '{}'", config))?;
    }
    let settings = Settings::current();

    let store = Arc::new(
        JsonFileStore::open(&args.store)
            .with_context(|| format!("Failed to open store '{}'", args.store))?,
    );
    debug!("Using store {}", store.path().display());
    let manager = ConfigManager::new(
        Arc::clone(&store),
        ReqwestFetcher::new(),
        SyncOptions::from_settings(&settings),
    );

    match args.command {
        Command::Import { input, sub, append } => {
            let content = read_input(&input)?;
            let (count, count_sub) = manager.import_batch_config(&content, &sub, append);
            info!("Imported {} profiles, {} subscriptions", count, count_sub);
            if count == 0 && count_sub == 0 {
                bail!("Nothing could be imported from '{}'", input);
            }
        }
        Command::Sync { id } => {
            let count = match id {
                Some(id) => manager.sync_one(&id),
                None => manager.sync_all(),
            };
            info!("Imported {} profiles", count);
        }
        Command::Share { id } => {
            let uri = manager.share_as_uri(&id);
            if uri.is_empty() {
                bail!("Profile '{}' not found or has no share URI", id);
            }
            println!("{}", uri);
        }
        Command::Export => print!("{}", manager.share_all()),
        Command::List => {
            let selected = store.get_selected_profile_id()?;
            for (id, profile) in store.list_profiles()? {
                let marker = if selected.as_deref() == Some(id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{} {} [{}] {} {}:{} {}",
                    marker,
                    id,
                    profile.config_type().name(),
                    profile.remarks,
                    profile.server,
                    profile.server_port,
                    profile.subscription_id
                );
            }
            for (id, subscription) in store.list_subscriptions()? {
                println!(
                    "sub {} {} {}{}",
                    id,
                    subscription.remarks,
                    subscription.url,
                    if subscription.enabled { "" } else { " (disabled)" }
                );
            }
        }
        Command::Select { id } => {
            if store.get_profile(&id)?.is_none() {
                bail!("Unknown profile '{}'", id);
            }
            store.set_selected_profile_id(Some(&id))?;
        }
    }

    Ok(())
}
