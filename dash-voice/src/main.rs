use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dash_dispatch::{ConfigError, Dispatcher, Registry, WatchSession};
use dash_events::{lookup_interface, select_network, InterfaceStatus, LineFeedWatcher, DEFAULT_CAPACITY};
use dash_speech::SpeechGateway;
use tracing::{debug, info, warn};

mod config;
mod logging;

use config::AppConfig;

/// dash-voice
///
/// Watches the network for dash button presses and speaks each button's
/// configured phrases to a nearby voice assistant.
#[derive(Parser, Debug)]
#[command(name = "dash-voice")]
#[command(about = "Turn dash button presses into spoken voice assistant commands")]
#[command(version)]
pub struct Args {
    /// Configuration file (default: ~/.dash-voice.yml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Network interface to watch, overrides the configuration
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Speech backend (polly, espeak), overrides the configuration
    #[arg(short, long)]
    pub backend: Option<String>,

    /// Log filter (error, warn, info, debug, trace or a full directive)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Validate the configuration, print the buttons and exit
    #[arg(long)]
    pub check: bool,
}

impl Args {
    /// Configuration file merged with environment and command line overrides.
    ///
    /// `env` looks up `DASH_VOICE_*` variables by name.
    fn resolve_config(&self, env: impl Fn(&str) -> Option<String>) -> Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        config.apply_overrides(env);

        if let Some(interface) = &self.interface {
            config.interface = interface.clone();
        }
        if let Some(backend) = &self.backend {
            config.backend = backend.clone();
        }
        Ok(config)
    }
}

/// Report the watched interface and the network range presses are expected on
fn check_interface(interface: &str) {
    match lookup_interface(interface) {
        InterfaceStatus::Present { networks } => match select_network(&networks) {
            Some(network) => info!("Using network range {} for interface {}", network, interface),
            None => warn!(
                interface,
                "Interface has no non-loopback IPv4 network of /16 or smaller, buttons may never be seen"
            ),
        },
        InterfaceStatus::Missing => warn!(interface, "Network interface not found, check the interface name"),
        InterfaceStatus::Unknown => debug!(interface, "Network interfaces cannot be listed, skipping check"),
    }
}

fn print_buttons(registry: &Registry, gateway: &SpeechGateway) {
    println!("Backend: {} (known: {})", gateway.options().backend_name, gateway.backend_names().join(", "));
    println!("{:<20} {:<18} {:>6} {:>8}", "BUTTON", "ADDRESS", "WAIT", "PHRASES");
    for command in registry.commands() {
        println!(
            "{:<20} {:<18} {:>5}s {:>8}",
            command.name(),
            command.address(),
            command.pacing_secs(),
            command.phrases().len()
        );
    }
}

async fn run(args: Args, env: impl Fn(&str) -> Option<String>) -> Result<()> {
    let config = args.resolve_config(env).context("Failed to load configuration")?;
    config.print_summary();
    check_interface(&config.interface);

    let registry = Arc::new(config.registry().context("Invalid button configuration")?);
    let gateway = SpeechGateway::new(config.voice_options())
        .map_err(ConfigError::from)
        .context("Invalid speech configuration")?;

    if args.check {
        print_buttons(&registry, &gateway);
        return Ok(());
    }

    let dispatcher = Dispatcher::new(registry.clone(), Arc::new(gateway), config.dispatch_options());

    let (watcher, feed) = LineFeedWatcher::new(config.debounce());
    let session = WatchSession::start(&watcher, &config.interface, &registry, DEFAULT_CAPACITY)
        .context("Failed to watch buttons")?;

    let feed_task = match &config.capture {
        Some(template) => feed
            .spawn_capture(template, &config.interface)
            .context("Failed to start capture program")?,
        None => {
            info!("No capture program configured, reading lines from stdin");
            feed.spawn_reader(tokio::io::BufReader::new(tokio::io::stdin()))
        }
    };

    info!(
        interface = %config.interface,
        buttons = session.watched(),
        backend = %config.backend,
        "dash-voice started"
    );

    let stats = session.run(&dispatcher).await;
    feed_task.abort();
    info!("Dispatcher stopped: {}", stats);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mode = logging::mode_from_env().context("Failed to initialize logging")?;
    logging::init_logging(mode, args.log_level.as_deref()).context("Failed to initialize logging")?;

    run(args, |name| std::env::var(name).ok()).await
}
