//! HookRelay CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: load `hookrelay.toml` and validate every
//!    declared watcher.
//! 2. **Wire observability**: configure `tracing-subscriber` with a pretty or
//!    JSON layer and, when an endpoint is configured, an OpenTelemetry OTLP
//!    exporter. All `tracing` spans and events from every crate flow through it.
//! 3. **Construct infrastructure**: the JSON payload adapter, the static
//!    watcher registry, the tokio scheduler, and the stdout sink, injected into
//!    a `PushHookProcessor`.
//! 4. **Run the command**: `process` feeds one payload file through the
//!    pipeline and waits for deferred delivery; `watchers` prints the
//!    validated watcher pool.

mod config;
mod observability;
mod output;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use correlation::{HostingVariant, OriginToken, Watcher};
use listener::{
    HookEventKind, JsonPayloadAdapter, ProcessOutcome, PushHookProcessor, StaticWatcherRegistry,
    TokioScheduler,
};
use tracing::info;

use crate::config::RelayConfig;
use crate::output::JsonLineSink;

#[derive(Debug, Parser)]
#[command(name = "hookrelay", version, about = "Correlate push webhooks with tracked heads")]
struct Cli {
    /// Path to the configuration file. A missing file means defaults.
    #[arg(long, short, global = true, default_value = "hookrelay.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Process one push webhook body and print the resulting deliveries.
    Process(ProcessArgs),
    /// Print the configured watchers after validation.
    Watchers,
}

#[derive(Debug, Args)]
struct ProcessArgs {
    /// Wire variant of the payload (`cloud` or `server`).
    #[arg(long)]
    variant: HostingVariant,

    /// File holding the webhook body; `-` reads stdin.
    #[arg(long)]
    payload: PathBuf,

    /// `X-Event-Key` of the delivery. Defaults to the variant's push key.
    #[arg(long)]
    event_key: Option<String>,

    /// Opaque origin token forwarded onto the event.
    #[arg(long)]
    origin: Option<String>,

    /// Overrides `event_delay_seconds` from the configuration.
    #[arg(long)]
    delay_seconds: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = RelayConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let _telemetry = observability::init(&config.logging)?;

    let watchers = config.watchers().context("validating watchers")?;

    match cli.command {
        Command::Process(args) => process(&config, watchers, args).await,
        Command::Watchers => {
            for watcher in &watchers {
                println!("{watcher}");
            }
            Ok(())
        }
    }
}

async fn process(
    config: &RelayConfig,
    watchers: Vec<Watcher>,
    args: ProcessArgs,
) -> anyhow::Result<()> {
    let hook = match args.event_key.as_deref() {
        Some(key) => match HookEventKind::from_event_key(key) {
            Some(hook) => hook,
            None => bail!("'{key}' is not a push event key"),
        },
        None => match args.variant {
            HostingVariant::Cloud => HookEventKind::RepoPush,
            HostingVariant::Server => HookEventKind::ServerRefsChanged,
        },
    };
    let delay = args
        .delay_seconds
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.event_delay());
    let body = read_payload(&args.payload)?;

    let sink = Arc::new(JsonLineSink);
    let registry = Arc::new(StaticWatcherRegistry::new(watchers));
    info!(watchers = registry.len(), "Watcher pool loaded");
    let scheduler = Arc::new(TokioScheduler::new(registry, sink.clone()));
    let processor = PushHookProcessor::new(Arc::new(JsonPayloadAdapter), sink, scheduler.clone())
        .with_delay(delay);

    let outcome = processor
        .process(
            hook,
            Some(body.as_str()),
            args.variant,
            args.origin.and_then(OriginToken::new),
        )
        .await;
    info!(?outcome, "Webhook processed");

    if matches!(outcome, ProcessOutcome::Scheduled { .. }) {
        scheduler.wait_idle().await;
    }
    Ok(())
}

fn read_payload(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .context("reading payload from stdin")?;
        return Ok(body);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
