//! The monitor event loop.
//!
//! A single [`Monitor`] owns every piece of mutable state in a
//! [`MonitorContext`]. Timer ticks, user commands, fetch completions and
//! permission answers arrive as events and are handled one at a time, so no
//! state is ever touched from two places at once. Fetches run as spawned tasks
//! and re-enter the loop when they complete; whichever completes last wins.

use chrono::Utc;
use display_utils::now_timestamp;
use stats::{MetricRecord, MetricSource, PollScheduler, PollTick, StatsClientError};
use std::{ops::ControlFlow, path::PathBuf, str::FromStr, sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{
    alerts::{AlertDispatcher, AudioCue, Notifier, Permission, APP_TITLE},
    config::Config,
    error::ExportError,
    export::export_csv,
    history::ShareHistory,
    presenter::{DisplayFields, Presenter, Severity},
    snapshot::SnapshotStore,
    store::{FileStore, LAST_ADDRESS_KEY},
};

/// Runtime knobs the monitor needs, taken from [`Config`]
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub refresh_interval: Duration,
    pub max_history_items: usize,
    pub highlight: Duration,
    pub export_dir: PathBuf,
}

impl From<&Config> for MonitorSettings {
    fn from(config: &Config) -> Self {
        Self {
            refresh_interval: config.refresh_interval(),
            max_history_items: config.monitor.max_history_items,
            highlight: config.highlight_duration(),
            export_dir: config.storage.export_dir.clone(),
        }
    }
}

/// The outside world as the monitor sees it
#[derive(Clone)]
pub struct Capabilities {
    pub presenter: Arc<dyn Presenter>,
    pub notifier: Arc<dyn Notifier>,
    pub audio: Arc<dyn AudioCue>,
}

/// User actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Refresh,
    TogglePause,
    SetAddress(String),
    EnableNotifications,
    Export,
    ShowHistory,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(word, rest)| (word, rest.trim()))
            .unwrap_or((line, ""));

        match word.to_ascii_lowercase().as_str() {
            "r" | "refresh" => Ok(Command::Refresh),
            "p" | "pause" | "resume" => Ok(Command::TogglePause),
            "a" | "address" => Ok(Command::SetAddress(rest.to_string())),
            "n" | "notify" => Ok(Command::EnableNotifications),
            "e" | "export" => Ok(Command::Export),
            "h" | "history" => Ok(Command::ShowHistory),
            "q" | "quit" | "exit" => Ok(Command::Quit),
            _ => Err(format!("Unknown command: {}", line)),
        }
    }
}

#[derive(Debug)]
pub enum MonitorEvent {
    Tick(PollTick),
    Command(Command),
    FetchCompleted {
        request: u64,
        address: String,
        result: Result<MetricRecord, StatsClientError>,
    },
    PermissionResolved(Permission),
}

/// Sends commands into a running monitor from other tasks
#[derive(Clone)]
pub struct MonitorHandle {
    events: mpsc::UnboundedSender<MonitorEvent>,
}

impl MonitorHandle {
    /// Returns false once the monitor has stopped
    pub fn send(&self, command: Command) -> bool {
        self.events.send(MonitorEvent::Command(command)).is_ok()
    }
}

/// Pick the address to monitor at startup: an explicit override, then the
/// last address used, then the configured default.
pub fn resolve_address(explicit: Option<&str>, store: &FileStore, default: &str) -> String {
    let explicit = explicit.map(str::trim).filter(|a| !a.is_empty());
    if let Some(address) = explicit {
        return address.to_string();
    }

    let last: Option<String> = store.get_or(LAST_ADDRESS_KEY, None);
    match last.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()) {
        Some(address) => address,
        None => default.to_string(),
    }
}

/// All mutable application state
pub struct MonitorContext {
    address: String,
    snapshot: SnapshotStore,
    history: ShareHistory,
    scheduler: PollScheduler,
    store: Arc<FileStore>,
}

impl MonitorContext {
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn snapshot(&self) -> &SnapshotStore {
        &self.snapshot
    }

    pub fn history(&self) -> &ShareHistory {
        &self.history
    }

    pub fn scheduler(&self) -> &PollScheduler {
        &self.scheduler
    }
}

pub struct Monitor<S> {
    ctx: MonitorContext,
    source: Arc<S>,
    presenter: Arc<dyn Presenter>,
    notifier: Arc<dyn Notifier>,
    dispatcher: AlertDispatcher,
    export_dir: PathBuf,
    next_request: u64,
    events_tx: mpsc::UnboundedSender<MonitorEvent>,
    events_rx: mpsc::UnboundedReceiver<MonitorEvent>,
    ticks_rx: mpsc::UnboundedReceiver<PollTick>,
}

impl<S: MetricSource + 'static> Monitor<S> {
    pub fn new(
        settings: MonitorSettings,
        address: String,
        store: Arc<FileStore>,
        source: Arc<S>,
        caps: Capabilities,
    ) -> Self {
        let (ticks_tx, ticks_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let ctx = MonitorContext {
            address: address.trim().to_string(),
            snapshot: SnapshotStore::new(),
            history: ShareHistory::load(store.clone(), settings.max_history_items),
            scheduler: PollScheduler::new(settings.refresh_interval, ticks_tx),
            store,
        };
        let dispatcher = AlertDispatcher::new(
            caps.presenter.clone(),
            caps.notifier.clone(),
            caps.audio,
            settings.highlight,
        );

        Self {
            ctx,
            source,
            presenter: caps.presenter,
            notifier: caps.notifier,
            dispatcher,
            export_dir: settings.export_dir,
            next_request: 0,
            events_tx,
            events_rx,
            ticks_rx,
        }
    }

    pub fn handle(&self) -> MonitorHandle {
        MonitorHandle {
            events: self.events_tx.clone(),
        }
    }

    pub fn context(&self) -> &MonitorContext {
        &self.ctx
    }

    /// Initial render, the startup fetch, then arm the refresh timer
    pub fn start(&mut self) {
        info!("Monitoring {}", self.ctx.address);
        self.presenter.render_history(self.ctx.history.entries());
        self.presenter.refresh_status(
            self.ctx.scheduler.is_enabled(),
            self.ctx.scheduler.period(),
        );
        self.fetch_current();
        self.ctx.scheduler.reset();
    }

    pub async fn run(mut self) {
        self.start();
        while let Some(event) = self.next_event().await {
            if self.handle_event(event).is_break() {
                break;
            }
        }
        self.ctx.scheduler.cancel();
        info!("Monitor stopped");
    }

    pub async fn next_event(&mut self) -> Option<MonitorEvent> {
        tokio::select! {
            Some(tick) = self.ticks_rx.recv() => Some(MonitorEvent::Tick(tick)),
            Some(event) = self.events_rx.recv() => Some(event),
            else => None,
        }
    }

    pub fn handle_event(&mut self, event: MonitorEvent) -> ControlFlow<()> {
        match event {
            MonitorEvent::Tick(tick) => self.on_tick(tick),
            MonitorEvent::Command(command) => return self.on_command(command),
            MonitorEvent::FetchCompleted {
                request,
                address,
                result,
            } => self.on_fetch_completed(request, &address, result),
            MonitorEvent::PermissionResolved(permission) => self.on_permission(permission),
        }
        ControlFlow::Continue(())
    }

    fn on_tick(&mut self, tick: PollTick) {
        if !self.ctx.scheduler.accepts(&tick) {
            debug!("Ignoring stale refresh tick #{}", tick.generation);
            return;
        }
        if !self.ctx.address.is_empty() {
            self.fetch_current();
        }
    }

    fn on_command(&mut self, command: Command) -> ControlFlow<()> {
        debug!("Command: {:?}", command);
        match command {
            Command::Refresh => self.manual_refresh(),
            Command::TogglePause => self.toggle_auto_refresh(),
            Command::SetAddress(address) => self.set_address(&address),
            Command::EnableNotifications => self.request_notifications(),
            Command::Export => self.export(),
            Command::ShowHistory => self.presenter.render_history(self.ctx.history.entries()),
            Command::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Start one fetch for the current address. The scheduler is not touched.
    fn fetch_current(&mut self) {
        if self.ctx.address.is_empty() {
            self.presenter.error("Please enter a valid BTC address");
            return;
        }

        self.next_request += 1;
        let request = self.next_request;
        let address = self.ctx.address.clone();
        let source = self.source.clone();
        let events = self.events_tx.clone();

        self.presenter.loading(true);
        debug!("Fetch #{} for {}", request, address);
        tokio::spawn(async move {
            let result = source.fetch(&address).await;
            let _ = events.send(MonitorEvent::FetchCompleted {
                request,
                address,
                result,
            });
        });
    }

    fn on_fetch_completed(
        &mut self,
        request: u64,
        address: &str,
        result: Result<MetricRecord, StatsClientError>,
    ) {
        self.presenter.loading(false);

        let record = match result {
            Ok(record) => record,
            Err(e) => {
                error!("Error fetching data for {} (#{}): {}", address, request, e);
                self.presenter
                    .error(&format!("Failed to fetch data: {}. Retrying...", e));
                return;
            }
        };

        debug!("Fetch #{} for {} completed", request, address);
        let alerts = self.ctx.snapshot.apply(record);
        if let Some(current) = self.ctx.snapshot.current() {
            let fields = DisplayFields::from_record(current, now_timestamp());
            self.presenter.render_stats(&fields);
        }
        self.dispatcher.dispatch(&alerts, &mut self.ctx.history);
    }

    fn manual_refresh(&mut self) {
        if self.ctx.address.is_empty() {
            self.presenter.error("Please enter a valid BTC address first");
            return;
        }
        self.fetch_current();
        self.presenter.toast("Refreshing...", Severity::Info);
    }

    fn toggle_auto_refresh(&mut self) {
        let enabled = self.ctx.scheduler.toggle();
        self.presenter
            .refresh_status(enabled, self.ctx.scheduler.period());

        if enabled {
            info!("Auto-refresh enabled");
            self.presenter.toast("Auto-refresh enabled", Severity::Info);
        } else {
            info!("Auto-refresh paused");
            self.presenter.toast("Auto-refresh paused", Severity::Info);
        }
    }

    fn set_address(&mut self, address: &str) {
        let address = address.trim();
        if address.is_empty() {
            self.presenter.error("Please enter a valid BTC address");
            return;
        }

        info!("Switching to address {}", address);
        self.ctx.address = address.to_string();
        if let Err(e) = self.ctx.store.set(LAST_ADDRESS_KEY, address) {
            warn!("Failed to save last address: {}", e);
        }

        self.fetch_current();
        self.ctx.scheduler.reset();
    }

    fn request_notifications(&mut self) {
        match self.notifier.permission() {
            Permission::Granted => {
                self.presenter
                    .toast("Notifications already enabled!", Severity::Success);
            }
            Permission::Denied => {
                info!("Notifications were denied, not asking again");
            }
            Permission::NotAsked => {
                let notifier = self.notifier.clone();
                let events = self.events_tx.clone();
                tokio::spawn(async move {
                    let permission = notifier.request_permission().await;
                    let _ = events.send(MonitorEvent::PermissionResolved(permission));
                });
            }
        }
    }

    fn on_permission(&mut self, permission: Permission) {
        if permission != Permission::Granted {
            info!("Notification permission not granted: {:?}", permission);
            return;
        }
        self.presenter
            .toast("Notifications enabled!", Severity::Success);
        self.dispatcher
            .send_notification(APP_TITLE, "Notifications are now enabled!");
    }

    fn export(&mut self) {
        match export_csv(self.ctx.snapshot.current(), &self.export_dir, Utc::now()) {
            Ok(_) => self
                .presenter
                .toast("Data exported successfully!", Severity::Success),
            Err(ExportError::NoData) => self
                .presenter
                .error("No data to export. Fetch stats first!"),
            Err(e) => {
                warn!("Export failed: {}", e);
                self.presenter
                    .error(&format!("Failed to export data: {}", e));
            }
        }
    }
}
