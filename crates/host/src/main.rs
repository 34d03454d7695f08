//! Carousel Host
//!
//! Headless host process for the carousel engine.
//!
//! Responsibilities:
//! - Render the configured product page and mount the carousel on it
//! - Read protocol signals from stdin, one JSON object per line
//! - Apply each signal to the carousel and answer with one response line
//! - Optionally complete transitions without waiting for a signal

use anyhow::{Context, Result};
use carousel_host::{Config, Session};
use carousel_protocol::{decode_signal, encode_line, Response, Signal};
use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Events that the host event loop processes.
enum HostEvent {
    /// A decoded signal from stdin.
    Signal(Signal),
    /// A line that could not be decoded.
    Invalid(String),
    /// Stdin closed or interrupt received.
    Shutdown,
}

#[derive(Parser)]
#[command(name = "carousel-host")]
#[command(author, version, about = "Headless carousel host driven over stdin/stdout")]
struct Args {
    /// Config file to load instead of searching the default locations
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Complete transitions automatically (overrides the config file)
    #[arg(long)]
    auto_complete: bool,
}

/// Read signal lines from stdin on a dedicated thread and forward them to
/// the event loop.
///
/// A blocking stdin read would hold up runtime shutdown, so the reader lives
/// outside the runtime and is not joined on exit.
fn spawn_stdin_thread(sender: mpsc::Sender<HostEvent>) -> Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("stdin-fwd".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let event = match line {
                    Ok(line) if line.trim().is_empty() => continue,
                    Ok(line) => {
                        debug!("Received signal: {}", line.trim());
                        match decode_signal(&line) {
                            Ok(signal) => HostEvent::Signal(signal),
                            Err(e) => HostEvent::Invalid(e.to_string()),
                        }
                    }
                    Err(e) => {
                        warn!("Failed to read from stdin: {}", e);
                        break;
                    }
                };
                if sender.blocking_send(event).is_err() {
                    return; // Channel closed, host shutting down
                }
            }
            debug!("Stdin closed");
            let _ = sender.blocking_send(HostEvent::Shutdown);
        })
        .map_err(|e| anyhow::anyhow!("Failed to spawn stdin thread: {}", e))
}

async fn write_response<W: AsyncWrite + Unpin>(writer: &mut W, response: &Response) -> Result<()> {
    let line = match encode_line(response) {
        Ok(line) => line,
        Err(e) => {
            warn!("Failed to serialize response: {}", e);
            "{\"status\":\"error\",\"message\":\"Internal serialization error\"}\n".to_string()
        }
    };
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO, // default fallback for invalid values
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration first (needed for log level)
    let mut config = match &args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load().unwrap_or_else(|e| {
            // Can't use tracing yet, fall back to eprintln
            eprintln!("Failed to load configuration: {}. Using defaults.", e);
            Config::default()
        }),
    };
    if args.auto_complete {
        config.behavior.auto_complete_transitions = true;
    }

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = LevelFilter::from_level(parse_level(&config.behavior.log_level));
        EnvFilter::default().add_directive(level.into())
    });

    // Stdout carries the protocol, so logs go to stderr
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    for w in config.validate() {
        warn!("Config: {} - {}", w.field, w.message);
    }

    info!("Carousel host starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded: items={}, viewport_width={}, item_width={}, margin_gap={}, auto_complete={}",
        config.page.item_count,
        config.page.viewport_width,
        config.carousel.item_width,
        config.carousel.margin_gap,
        config.behavior.auto_complete_transitions
    );

    let mut session = Session::new(&config).context("Failed to start session")?;
    if !session.is_mounted() {
        warn!("Running with a static page");
    }

    // Create event channel
    let (event_tx, mut event_rx) = mpsc::channel::<HostEvent>(100);

    // Not joined: the thread may be parked in a stdin read at exit
    let _stdin_handle = spawn_stdin_thread(event_tx.clone())?;

    let interrupt_tx = event_tx;
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = interrupt_tx.send(HostEvent::Shutdown).await;
        }
    });

    let mut stdout = tokio::io::stdout();

    // Main event loop
    loop {
        let event = match event_rx.recv().await {
            Some(e) => e,
            None => break,
        };

        match event {
            HostEvent::Signal(signal) => {
                let stop = signal == Signal::Stop;
                let response = session.apply(signal);
                if let Err(e) = write_response(&mut stdout, &response).await {
                    error!("Failed to write response: {}", e);
                    break;
                }
                if stop {
                    info!("Stop signal received");
                    break;
                }
            }
            HostEvent::Invalid(message) => {
                let response = Response::error(format!("Invalid signal: {}", message));
                if let Err(e) = write_response(&mut stdout, &response).await {
                    error!("Failed to write response: {}", e);
                    break;
                }
            }
            HostEvent::Shutdown => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!("Carousel host stopped");
    Ok(())
}
