/*
[INPUT]:  CLI arguments, optional YAML configuration, OS shutdown signals
[OUTPUT]: Biometric-gated to-do TUI with persisted tasks
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

mod tui;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use todo_gate_core::config::LoggingConfig;
use todo_gate_core::{AppConfig, FileStore, KeyValueStore, MemoryStore, Session};

use crate::tui::{LogBuffer, LogBufferHandle, LogWriterFactory, run_tui_with_log};

#[derive(Parser, Debug)]
#[command(name = "todo-gate", version, about = "To-do list behind a mock biometric gate")]
struct Cli {
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,
    #[arg(long = "data-dir", value_name = "DIR")]
    data_dir: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL")]
    log_level: Option<String>,
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,
    /// Keep tasks in memory only
    #[arg(long = "ephemeral")]
    ephemeral: bool,
    /// Print the effective configuration as YAML and exit
    #[arg(long = "print-config")]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let config = load_config(&args)?;

    if args.print_config {
        print!("{}", config.to_yaml().context("render config")?);
        return Ok(());
    }

    let log_buffer: LogBufferHandle =
        Arc::new(StdMutex::new(LogBuffer::new(config.logging.buffer_capacity)));
    let _file_guard = init_tracing(&config.logging, log_buffer.clone())?;

    info!(
        ephemeral = args.ephemeral,
        scan_delay_ms = config.auth.scan_delay_ms,
        settle_delay_ms = config.auth.settle_delay_ms,
        "starting todo-gate"
    );

    let storage = build_storage(&config, args.ephemeral);
    let session = Session::simulated(storage, config.timing());

    let shutdown = CancellationToken::new();
    setup_signal_handlers(shutdown.clone());

    run_tui_with_log(session, log_buffer, shutdown)
        .await
        .context("run tui")?;
    info!("todo-gate exited");
    Ok(())
}

fn load_config(args: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(args.config_path.as_deref()).context("load config")?;
    if let Some(dir) = &args.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if let Some(file) = &args.log_file {
        config.logging.file = Some(file.clone());
    }
    config.validate().context("validate config")?;
    Ok(config)
}

fn init_tracing(logging: &LoggingConfig, buffer: LogBufferHandle) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&logging.level).context("invalid log level")?;

    // The terminal is in raw mode, so nothing may go to stdout
    let panel_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(LogWriterFactory::new(buffer));

    let (file_layer, guard) = match &logging.file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(open_log_file(path)?);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(panel_layer)
        .with(file_layer)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(guard)
}

fn open_log_file(path: &Path) -> Result<tracing_appender::rolling::RollingFileAppender> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .context("log file path must name a file")?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create log dir {}", dir.display()))?;
    Ok(tracing_appender::rolling::never(dir, file_name))
}

fn build_storage(config: &AppConfig, ephemeral: bool) -> Arc<dyn KeyValueStore> {
    if ephemeral {
        info!("using in-memory storage; tasks will not outlive this run");
        return Arc::new(MemoryStore::new());
    }

    let opened = config
        .resolve_data_dir()
        .map_err(|err| anyhow!(err))
        .and_then(|dir| {
            FileStore::open(&dir)
                .with_context(|| format!("open data dir {}", dir.display()))
        });
    match opened {
        Ok(store) => {
            info!(data_dir = %store.dir().display(), "using file storage");
            Arc::new(store)
        }
        Err(err) => {
            warn!(error = %format!("{err:#}"), "file storage unavailable; falling back to memory");
            Arc::new(MemoryStore::new())
        }
    }
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }

    #[cfg(not(unix))]
    {
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "failed to install ctrl-c handler");
                return;
            }
            shutdown.cancel();
        });
    }
}
