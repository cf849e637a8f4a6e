// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (tracing -> stderr, filtered by RUST_LOG)
// 2. Parse command-line arguments using clap
// 3. Start one crawl per URL and wait until they run out of pages, the
//    --duration elapses, or the user presses Ctrl-C
// 4. Stop every crawl and print the site trees
// 5. Exit with proper code (0 = success, 2 = error)
// =============================================================================

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, CrawlSettings};
use site_mapper::{site, CrawlService, SiteListing};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "site_mapper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl {
            urls,
            duration,
            json,
            settings,
        } => handle_crawl(&urls, duration, json, &settings).await,
    }
}

// Handles the 'crawl' subcommand
async fn handle_crawl(
    urls: &[String],
    duration: Option<u64>,
    json: bool,
    settings: &CrawlSettings,
) -> Result<()> {
    let config = settings.resolve()?;
    let mut service = CrawlService::new(config)?;

    for url in urls {
        service.start(url)?;
        eprintln!("🔍 Crawling {}", url);
    }

    // A duration of None never fires
    let deadline = async {
        match duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        _ = service.wait_idle() => info!("every site exhausted"),
        _ = deadline => info!("time limit reached"),
        _ = tokio::signal::ctrl_c() => info!("interrupted"),
    }

    service.stop_all().await;
    print_listings(&service.list(), json)
}

// Prints the trees either as box-drawing text or JSON
fn print_listings(listings: &[SiteListing], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(listings)?);
        return Ok(());
    }

    for listing in listings {
        println!("{}", listing.url);
        print!("{}", site::render(&listing.tree));
        println!();
    }

    println!("📊 Summary:");
    for listing in listings {
        // The root is the host, not a page path
        println!(
            "   {}: {} path(s)",
            listing.url,
            listing.tree.node_count() - 1
        );
    }
    Ok(())
}
