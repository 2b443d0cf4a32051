//! `scopeview`: terminal front end for Weave Scope topologies.
//!
//! Polls a Scope app server for its topologies and nodes and shows them as
//! a graph list, a table, or a resource view. The view state is routable:
//! on exit the final location is printed so a session can be resumed with
//! `--location`.
//!
//! Logs go to a file so they never corrupt the terminal.
//!
//! Entry point: CLI argument parsing, config loading, tracing setup, panic
//! hooks, and app launch.

mod app;
mod event;
mod fetch;
mod keys;
mod layout;
mod theme;
mod tui;
mod widgets;

use std::path::{Path, PathBuf};

use clap::{Parser, builder::FalseyValueParser};
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use scopeview_api::{ScopeClient, TlsMode, TransportConfig};
use scopeview_config::Config;
use scopeview_core::{Location, LogTracker, RouterOptions, ViewState};

use crate::app::{AppShell, ShellOptions};
use crate::tui::TerminalSurface;

/// Terminal front end for Weave Scope.
#[allow(clippy::struct_excessive_bools)]
#[derive(Parser, Debug)]
#[command(name = "scopeview", version, about)]
struct Cli {
    /// Scope app server URL (e.g., http://localhost:4040)
    #[arg(short = 'u', long)]
    url: Option<String>,

    /// Location to start from, e.g. `/state/<encoded view>`
    #[arg(short = 'l', long, default_value = "/")]
    location: String,

    /// Carry the route in the location path instead of a `#!` fragment
    #[arg(long)]
    no_hashbang: bool,

    /// Always load topologies on start, even when the location has a route
    #[arg(long, env = "WEAVE_CLOUD", value_parser = FalseyValueParser::new())]
    always_fetch: bool,

    /// Accept invalid TLS certificates from the app server
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Run without contacting an app server
    #[arg(long)]
    offline: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Log file (defaults to the platform cache directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Layer CLI flags over the loaded config.
    fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.api_url.clone_from(url);
        }
        if self.no_hashbang {
            config.hashbang = false;
        }
        config.always_fetch_topologies |= self.always_fetch;
        config.insecure |= self.insecure;
        if self.log_file.is_some() {
            config.log_file.clone_from(&self.log_file);
        }
    }
}

/// File-based tracing. Nothing may be written to stdout/stderr while the
/// terminal is in raw mode. Hold the guard until exit so logs flush.
fn setup_tracing(log_file: &Path, verbose: u8) -> WorkerGuard {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "scopeview={log_level},scopeview_core={log_level},scopeview_api={log_level}"
        ))
    });

    let log_dir = log_file.parent().unwrap_or(Path::new("."));
    let log_filename = log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("scopeview.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

fn build_client(config: &Config) -> Result<ScopeClient> {
    let url = config.api_url()?;
    let transport = TransportConfig {
        tls: if config.insecure {
            TlsMode::DangerAcceptInvalid
        } else {
            TlsMode::System
        },
        timeout: config.request_timeout(),
    };
    ScopeClient::new(url, &transport).wrap_err("failed to build app server client")
}

fn shell_options(config: &Config) -> ShellOptions {
    ShellOptions {
        router: RouterOptions {
            hashbang: config.hashbang,
        },
        always_fetch_topologies: config.always_fetch_topologies,
        resize_debounce: config.resize_debounce(),
        refresh_interval: config.refresh_interval(),
        tick_rate: config.tick_rate(),
        frame_rate: config.frame_rate(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks go in before the terminal is touched
    tui::install_hooks()?;

    let mut config = match &cli.config {
        Some(path) => scopeview_config::load_config_from(path),
        None => scopeview_config::load_config(),
    }
    .wrap_err("failed to load config")?;
    cli.apply(&mut config);

    let _log_guard = setup_tracing(&config.log_file(), cli.verbose);
    info!(
        url = %config.api_url,
        location = %cli.location,
        hashbang = config.hashbang,
        "starting scopeview"
    );

    let client = if cli.offline {
        None
    } else {
        Some(build_client(&config)?)
    };

    let mut shell = AppShell::new(
        ViewState::with_preferred_topology(config.default_topology.clone()),
        Location::parse(&cli.location),
        shell_options(&config),
        client,
        Box::new(TerminalSurface),
        Box::new(LogTracker),
    );
    let location = shell.run().await?;

    println!("{location}");
    Ok(())
}
