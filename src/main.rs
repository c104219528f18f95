//! feedcache - Fetch an image feed and keep a validated local cache
//!
//! Composition root wiring the remote loader, the local feed loader and the
//! configured store backing.

use std::process;

use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feedcache::cache::LocalFeedLoader;
use feedcache::cli::{Action, Cli, Config};
use feedcache::data::{FeedImage, RemoteFeedLoader, ReqwestHttpClient};

/// Installs the stderr log subscriber, honouring `RUST_LOG`
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feedcache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Prints one image per line: id, url, location, description
fn print_feed(feed: &[FeedImage]) {
    for image in feed {
        println!(
            "{}\t{}\t{}\t{}",
            image.id,
            image.url,
            image.location.as_deref().unwrap_or("-"),
            image.description.as_deref().unwrap_or("")
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", err);
            process::exit(2);
        }
    };

    let store = config.open_store()?;
    let local = LocalFeedLoader::new(store, Utc::now);

    match config.action {
        Action::Refresh(url) => {
            let remote = RemoteFeedLoader::new(url, ReqwestHttpClient::new());
            let feed = remote.load().await?;
            local.save(&feed).await?;
            tracing::info!(items = feed.len(), "Feed cache refreshed");
            println!("Cached {} images", feed.len());
        }
        Action::Show { json } => {
            let feed = local.load().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&feed)?);
            } else {
                print_feed(&feed);
            }
        }
        Action::Validate => {
            local.validate_cache().await;
            tracing::info!(path = %config.store_path.display(), "Feed cache validated");
        }
    }

    Ok(())
}
