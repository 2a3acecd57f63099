//! Scuttle command-line interface
//!
//! Any number of scuttle instances pointed at the same store cooperate on
//! one crawl: every URL is fetched once, discovered links are deduplicated
//! globally, and an interrupted run is repaired with `recover`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use scuttle::config::{load_settings, validate_settings, CrawlerOptions, Settings};
use scuttle::extract::{Extractor, SelectorExtractor};
use scuttle::frontier::Frontier;
use scuttle::store::{RedisStore, Store};
use scuttle::Crawler;
use tracing_subscriber::EnvFilter;

/// Scuttle: a cooperative web crawler driven by a shared keyed store
#[derive(Parser, Debug)]
#[command(name = "scuttle")]
#[command(version)]
#[command(about = "A cooperative web crawler driven by a shared keyed store", long_about = None)]
struct Cli {
    /// Store host
    #[arg(short = 's', long, default_value = "localhost")]
    server: String,

    /// Store port
    #[arg(short = 'p', long, default_value_t = 6379)]
    port: u16,

    /// Parallel workers per batch
    #[arg(short = 'w', long, default_value_t = 8)]
    workers: usize,

    /// Maximum idle HTTP connections
    #[arg(short = 'c', long, default_value_t = 20)]
    connections: usize,

    /// Consecutive fetch failures tolerated before the run aborts
    #[arg(short = 'e', long, default_value_t = 20)]
    max_errors: u32,

    /// Seconds between statistics lines
    #[arg(long, default_value_t = 1)]
    stats_interval: u64,

    /// User-Agent header for fetches
    #[arg(long)]
    user_agent: Option<String>,

    /// SOCKS5 proxy endpoint (host:port) for fetches
    #[arg(long)]
    proxy: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Persist crawl settings to the store
    Set {
        /// Base URL to crawl
        #[arg(long)]
        url: Option<String>,

        /// TOML settings file (takes precedence over the other flags)
        #[arg(long)]
        file: Option<PathBuf>,

        /// File holding the extraction rule spec
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Discard links containing this substring (repeatable)
        #[arg(long = "exclude")]
        exclude: Vec<String>,

        /// Require links to contain one of these substrings (repeatable)
        #[arg(long = "include")]
        include: Vec<String>,

        /// Keep query parameters on discovered links
        #[arg(long)]
        allow_query: bool,

        /// Keep hash fragments on discovered links
        #[arg(long)]
        allow_hash: bool,

        /// Record pages without following their links
        #[arg(long)]
        no_follow: bool,
    },

    /// Crawl until the todo set drains or a fatal error stops the run
    Crawl {
        /// Erase all previous crawl state first
        #[arg(long)]
        erase: bool,
    },

    /// Add seed URLs, from arguments or a file with one URL per line
    Seed {
        /// URLs to seed
        urls: Vec<String>,

        /// File with one URL per line
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Move every doing and trash entry back to todo
    #[command(alias = "redo")]
    Recover,

    /// Wipe all crawl state, settings included
    Flush,

    /// Print every tracked URL
    Dump {
        /// Print done URLs with their extracted data instead
        #[arg(long)]
        map: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let options = CrawlerOptions {
        store_host: cli.server.clone(),
        store_port: cli.port,
        workers: cli.workers,
        max_connections: cli.connections,
        max_errors: cli.max_errors,
        stats_interval: cli.stats_interval,
        user_agent: cli.user_agent.clone(),
        proxy: cli.proxy.clone(),
        erase_store: matches!(&cli.command, Command::Crawl { erase: true }),
    };

    let store: Arc<dyn Store> =
        Arc::new(RedisStore::connect(&options.store_host, options.store_port).await?);
    let extractor: Arc<dyn Extractor> = Arc::new(SelectorExtractor);

    match cli.command {
        Command::Set {
            url,
            file,
            rules,
            exclude,
            include,
            allow_query,
            allow_hash,
            no_follow,
        } => {
            let settings = if let Some(path) = file {
                load_settings(&path)?
            } else {
                let settings = Settings {
                    base_url: url.unwrap_or_default(),
                    extraction_rules: match rules {
                        Some(path) => std::fs::read_to_string(path)?,
                        None => String::new(),
                    },
                    keywords_to_exclude: exclude,
                    keywords_to_include: include,
                    allow_query_parameters: allow_query,
                    allow_hash_parameters: allow_hash,
                    dont_follow_links: no_follow,
                };
                validate_settings(&settings)?;
                settings
            };

            let crawler = Crawler::init(options, store, Some(settings), Some(extractor)).await?;
            println!("Settings saved for {}", crawler.settings().base_url);
        }

        Command::Crawl { .. } => {
            let mut crawler = Crawler::init(options, store, None, Some(extractor)).await?;
            println!("Starting crawl on {}\n", crawler.settings().base_url);
            crawler.crawl().await?;
            println!("Crawl finished");
        }

        Command::Seed { urls, file } => {
            let mut seeds = urls;
            if let Some(path) = file {
                let content = std::fs::read_to_string(path)?;
                seeds.extend(
                    content
                        .lines()
                        .map(str::trim)
                        .filter(|line| !line.is_empty())
                        .map(String::from),
                );
            }
            if seeds.is_empty() {
                anyhow::bail!("no seed URLs given");
            }

            let crawler = Crawler::init(options, store, None, Some(extractor)).await?;
            crawler.add_seeds(&seeds).await?;
            println!("Added {} seed links", seeds.len());
        }

        Command::Recover => {
            let moved = Frontier::new(store).recover().await?;
            println!("Requeued {moved} urls");
        }

        Command::Flush => {
            store.flush_all().await?;
            println!("Flushed all crawl state");
        }

        Command::Dump { map } => {
            let frontier = Frontier::new(store);
            if map {
                for (url, data) in frontier.dump_map().await? {
                    println!("{url}\t{data}");
                }
            } else {
                for url in frontier.dump().await? {
                    println!("{url}");
                }
            }
        }
    }

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("scuttle=info,warn"),
            1 => EnvFilter::new("scuttle=debug,info"),
            2 => EnvFilter::new("scuttle=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
