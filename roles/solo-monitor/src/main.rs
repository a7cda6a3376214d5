mod args;

use solo_monitor::{
    alerts::{AudioCue, Notifier},
    monitor::resolve_address,
    presenter::Presenter,
    store::FileStore,
    terminal::{TerminalBell, TerminalNotifier, TerminalPresenter},
    Capabilities, Command, Monitor, MonitorHandle, MonitorSettings,
};
use stats::StatsClient;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use args::process_cli_args;

/// Forward each line typed on stdin to the monitor as a command
async fn read_commands(handle: MonitorHandle, presenter: Arc<dyn Presenter>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => match line.parse::<Command>() {
                Ok(command) => {
                    if !handle.send(command) {
                        break;
                    }
                }
                Err(message) => presenter.error(&message),
            },
            Ok(None) => {
                debug!("stdin closed, no more commands");
                break;
            }
            Err(e) => {
                warn!("Failed to read command: {}", e);
                break;
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, config) = process_cli_args()?;

    // Stdout belongs to the screen, so logs go to a file or to stderr
    let default_filter = if args.log_file.is_some() { "info" } else { "warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    let fmt_layer = tracing_subscriber::fmt().with_env_filter(env_filter);

    if let Some(log_file) = &args.log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .map_err(|e| format!("Failed to open log file {}: {}", log_file.display(), e))?;
        fmt_layer
            .with_ansi(false)
            .with_writer(Arc::new(file))
            .init();
    } else {
        fmt_layer.with_writer(std::io::stderr).init();
    }

    info!("Starting solo monitor");
    info!("Stats endpoint: {}", config.endpoint.url);

    let store = Arc::new(FileStore::open(&config.storage.data_dir)?);
    info!("Data directory: {}", store.dir().display());

    let address = resolve_address(
        args.address.as_deref(),
        &store,
        &config.monitor.default_address,
    );

    let source = Arc::new(StatsClient::new(
        &config.endpoint.url,
        config.request_timeout(),
        config.pool_idle_timeout(),
    )?);

    let presenter: Arc<dyn Presenter> =
        Arc::new(TerminalPresenter::stdout(config.refresh_interval()));
    let notifier: Arc<dyn Notifier> =
        Arc::new(TerminalNotifier::new(config.notifications.permission));
    let audio: Arc<dyn AudioCue> = Arc::new(TerminalBell::new(config.notifications.sound));
    let caps = Capabilities {
        presenter: presenter.clone(),
        notifier,
        audio,
    };

    let monitor = Monitor::new(
        MonitorSettings::from(&config),
        address,
        store,
        source,
        caps,
    );

    tokio::spawn(read_commands(monitor.handle(), presenter));

    let handle = monitor.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, shutting down");
            handle.send(Command::Quit);
        }
    });

    monitor.run().await;
    Ok(())
}
