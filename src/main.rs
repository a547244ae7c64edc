//! CLI entry point for the subway arrivals board.
//!
//! Shows upcoming trains for the configured station views, once or on a
//! refresh loop, and can inspect individual feeds.

use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Url;
use subway_arrivals::{
    config::{StationConfig, StationTable},
    display::DisplayModel,
    error::AggregateError,
    feeds::FeedId,
    fetch::{BasicClient, DirFeedSource, FeedSource, HttpFeedSource, fetch_bytes},
    parser::parse_feed,
    refresh::refresh_view,
    render::{JsonRenderer, Renderer, TerminalRenderer, print_stats_json},
    stats::FeedStats,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "subway_arrivals")]
#[command(about = "Live subway arrival board for a few fixed stations", long_about = None)]
struct Cli {
    /// JSON station table to use instead of the built-in one
    #[arg(long, global = true, value_name = "FILE")]
    stations: Option<String>,

    /// Read feeds from `<DIR>/<feed>.pb` instead of the network
    #[arg(long, global = true, value_name = "DIR", conflicts_with = "proxy")]
    feeds_dir: Option<String>,

    /// Fetch feeds through a relay taking the upstream URL as `?feed=`
    #[arg(long, global = true, value_name = "URL")]
    proxy: Option<String>,

    /// Emit JSON lines instead of a text board
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh once and print the board
    Show {
        /// View to show (all views when omitted)
        #[arg(short, long)]
        view: Option<String>,
    },
    /// Keep the board refreshed. Type a view key and Enter to switch views,
    /// or press Enter alone to refresh now.
    Watch {
        /// View to start on (first view when omitted)
        #[arg(short, long)]
        view: Option<String>,

        /// Seconds between refreshes
        #[arg(short, long, default_value_t = 30)]
        interval: u64,
    },
    /// List configured station views
    Stations,
    /// Decode a feed and print a summary of its contents
    Inspect {
        /// Feed key (e.g. `nqrw`), file path or URL
        #[arg(value_name = "FEED_FILE_OR_URL")]
        source: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/subway_arrivals.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("subway_arrivals.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let table = match &cli.stations {
        Some(path) => StationTable::load(path)?,
        None => StationTable::builtin(),
    };
    let source = feed_source(&cli)?;
    let mut renderer: Box<dyn Renderer> = if cli.json {
        Box::new(JsonRenderer::new(std::io::stdout()))
    } else {
        Box::new(TerminalRenderer::new(std::io::stdout()))
    };

    match cli.command {
        Commands::Show { view } => {
            let views: Vec<&StationConfig> = match view {
                Some(key) => vec![lookup_view(&table, &key)?],
                None => table.views().iter().collect(),
            };

            let mut failed = 0;
            for view in &views {
                let result = refresh_view(&*source, view).await;
                if result.is_err() {
                    failed += 1;
                }
                paint(renderer.as_mut(), view, result);
            }

            anyhow::ensure!(failed == 0, "{failed} of {} views unavailable", views.len());
        }
        Commands::Watch { view, interval } => {
            let start = match view {
                Some(key) => lookup_view(&table, &key)?,
                None => table.first().context("station table is empty")?,
            };
            anyhow::ensure!(interval > 0, "interval must be at least one second");
            watch(&*source, &table, start, interval, renderer.as_mut()).await?;
        }
        Commands::Stations => {
            for view in table.views() {
                for station in view.stations() {
                    let feeds: Vec<&str> = station.feeds.iter().map(|f| f.key()).collect();
                    info!(
                        view = %view.key,
                        station = %station.name,
                        direction = %station.direction,
                        label = %station.direction_label,
                        stops = %station.stops.join(","),
                        feeds = %feeds.join(","),
                        "Station"
                    );
                }
            }
            info!(total = table.views().len(), "Station views");
        }
        Commands::Inspect { source: target } => {
            let bytes = fetcher(&*source, &target).await?;
            let feed = parse_feed(&bytes).with_context(|| format!("failed to decode {target}"))?;
            let stats = FeedStats::from_feed(&feed).with_feed_id(&target);

            print_stats_json(&mut std::io::stdout(), &stats)?;
        }
    }

    Ok(())
}

/// Picks where feed bytes come from based on the command-line flags.
fn feed_source(cli: &Cli) -> Result<Box<dyn FeedSource>> {
    if let Some(dir) = &cli.feeds_dir {
        info!(dir = %dir, "Reading feeds from directory");
        return Ok(Box::new(DirFeedSource::new(dir)));
    }

    let client = BasicClient::new()?;
    match &cli.proxy {
        Some(proxy) => {
            let proxy = Url::parse(proxy).with_context(|| format!("invalid proxy URL '{proxy}'"))?;
            info!(proxy = %proxy, "Fetching feeds through proxy");
            Ok(Box::new(HttpFeedSource::via_proxy(client, proxy)))
        }
        None => Ok(Box::new(HttpFeedSource::direct(client))),
    }
}

fn lookup_view<'a>(table: &'a StationTable, key: &str) -> Result<&'a StationConfig> {
    table.get(key).with_context(|| {
        let known: Vec<&str> = table.views().iter().map(|v| v.key.as_str()).collect();
        format!("unknown view '{key}' (known: {})", known.join(", "))
    })
}

/// Loads feed bytes for a feed key, a URL, or a local file.
#[tracing::instrument(skip(source))]
async fn fetcher(source: &dyn FeedSource, target: &str) -> Result<Vec<u8>> {
    let bytes = if target.starts_with("http") {
        let client = BasicClient::new()?;
        fetch_bytes(&client, target).await?.to_vec()
    } else if let Ok(feed) = target.parse::<FeedId>() {
        source.fetch_feed_bytes(feed).await?.to_vec()
    } else {
        std::fs::read(target).with_context(|| format!("failed to read {target}"))?
    };
    Ok(bytes)
}

fn paint(
    renderer: &mut dyn Renderer,
    view: &StationConfig,
    result: Result<DisplayModel, AggregateError>,
) {
    match result {
        Ok(model) => renderer.render(&model, &view.direction_label),
        Err(e) => {
            error!(view = %view.key, error = %e, "Refresh failed");
            renderer.render_unavailable(&view.key, &e);
        }
    }
}

/// A user request arriving on stdin.
enum Trigger {
    RefreshNow,
    Switch(String),
}

/// Waits for the next line on stdin. Once stdin closes this never resolves,
/// leaving only the timer to drive refreshes.
async fn next_trigger(input: &mut Option<Lines<BufReader<Stdin>>>) -> Trigger {
    loop {
        let Some(lines) = input else {
            return std::future::pending().await;
        };
        let next = lines.next_line().await;
        match next {
            Ok(Some(line)) => {
                let line = line.trim();
                return if line.is_empty() {
                    Trigger::RefreshNow
                } else {
                    Trigger::Switch(line.to_string())
                };
            }
            Ok(None) => *input = None,
            Err(e) => {
                warn!(error = %e, "Stopped reading stdin");
                *input = None;
            }
        }
    }
}

/// Applies a trigger to the active view. Returns whether a refresh should
/// start immediately.
fn apply_trigger<'a>(
    table: &'a StationTable,
    view: &mut &'a StationConfig,
    trigger: Trigger,
) -> bool {
    match trigger {
        Trigger::RefreshNow => true,
        Trigger::Switch(key) => match table.get(&key) {
            Some(next) => {
                info!(from = %view.key, to = %next.key, "Switching view");
                *view = next;
                true
            }
            None => {
                warn!(view = %key, "Unknown view, ignoring");
                false
            }
        },
    }
}

/// Refreshes `start` every `interval_secs`, switching views on demand.
///
/// A trigger arriving while a cycle is in flight drops that cycle, which
/// cancels its outstanding fetches; only the newest cycle ever paints.
async fn watch(
    source: &dyn FeedSource,
    table: &StationTable,
    start: &StationConfig,
    interval_secs: u64,
    renderer: &mut dyn Renderer,
) -> Result<()> {
    let period = Duration::from_secs(interval_secs);
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut input = Some(BufReader::new(tokio::io::stdin()).lines());
    let mut view = start;

    info!(view = %view.key, interval_secs, "Watching. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            result = refresh_view(source, view) => {
                paint(renderer, view, result);
                ticker.reset();
            }
            trigger = next_trigger(&mut input) => {
                apply_trigger(table, &mut view, trigger);
                info!(view = %view.key, "Refresh superseded");
                continue;
            }
            _ = tokio::signal::ctrl_c() => break,
        }

        loop {
            tokio::select! {
                _ = ticker.tick() => break,
                trigger = next_trigger(&mut input) => {
                    if apply_trigger(table, &mut view, trigger) {
                        break;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Stopping");
                    return Ok(());
                }
            }
        }
    }

    info!("Stopping");
    Ok(())
}
