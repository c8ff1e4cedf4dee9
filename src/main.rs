//! web-distill main entry point
//!
//! Command-line front-end for fetching pages and running web searches.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use web_distill::config::{load_config, Config};
use web_distill::output::{format_page_content, format_search_response};
use web_distill::{FetchRequest, SearchClient, SearchRequest, WebFetcher};

/// web-distill: fetch web pages and distill them into readable text
///
/// Requests are shaped to look like ordinary browser traffic, and
/// rate-limited responses are retried with backoff.
#[derive(Parser, Debug)]
#[command(name = "web-distill")]
#[command(version = "1.0.0")]
#[command(about = "Fetch and distill web pages, or run a web search", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults plus environment if omitted)
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a page and print its distilled content
    Fetch {
        /// URL to fetch (http or https)
        url: String,

        /// List the links found on the page
        #[arg(long)]
        links: bool,

        /// List the images found on the page
        #[arg(long)]
        images: bool,

        /// Send this user agent instead of a random pick
        #[arg(long, value_name = "UA")]
        user_agent: Option<String>,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a web search
    Search {
        /// The search query
        query: String,

        /// search_std, search_pro, search_pro_sogou or search_pro_quark
        #[arg(long, value_name = "ENGINE")]
        engine: Option<String>,

        /// Request an intent analysis
        #[arg(long)]
        intent: bool,

        /// Print the raw response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that the binary runs
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    if let Command::Ping = cli.command {
        println!("pong");
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load {}", path.display()))?
        }
        None => Config::from_env().context("invalid environment configuration")?,
    };

    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(cancel.clone());

    match cli.command {
        Command::Fetch {
            url,
            links,
            images,
            user_agent,
            json,
        } => {
            let request = FetchRequest {
                url,
                include_links: links,
                include_images: images,
                user_agent,
            };
            Ok(handle_fetch(&config, &request, json, &cancel).await?)
        }
        Command::Search {
            query,
            engine,
            intent,
            json,
        } => {
            let request = SearchRequest {
                query,
                search_engine: engine,
                search_intent: intent,
            };
            Ok(handle_search(&config, &request, json, &cancel).await?)
        }
        Command::Ping => Ok(()),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout carries only the report.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("web_distill=info,warn"),
            1 => EnvFilter::new("web_distill=debug,info"),
            2 => EnvFilter::new("web_distill=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            cancel.cancel();
        }
    });
}

async fn handle_fetch(
    config: &Config,
    request: &FetchRequest,
    json: bool,
    cancel: &CancellationToken,
) -> web_distill::Result<()> {
    let fetcher = WebFetcher::new(config)?;

    let page = match fetcher.fetch_with_cancel(request, cancel).await {
        Ok(page) => page,
        Err(e) => {
            tracing::error!("Fetch failed ({:?}): {}", e.kind(), e);
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        print!(
            "{}",
            format_page_content(&page, request.include_links, request.include_images)
        );
    }

    Ok(())
}

async fn handle_search(
    config: &Config,
    request: &SearchRequest,
    json: bool,
    cancel: &CancellationToken,
) -> web_distill::Result<()> {
    let client = SearchClient::new(config)?;

    let response = match client.search(request, cancel).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Search failed: {}", e);
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        let engine = client.resolve_engine(request);
        print!("{}", format_search_response(&response, &request.query, engine));
    }

    Ok(())
}
