//! Terminal implementations of the presentation, notification and audio
//! capabilities.
//!
//! The presenter keeps a [`Screen`] model and redraws the whole screen on every
//! change. Transient messages and the best-share highlight carry an expiry and
//! are pruned on the next redraw; a timer task forces that redraw once they lapse.

use async_trait::async_trait;
use std::{
    fmt::Write as _,
    io::{self, Write},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

use crate::{
    alerts::{AudioCue, Notifier, Permission, APP_TITLE},
    error::EffectError,
    history::HistoryEntry,
    presenter::{
        refresh_status_text, DisplayFields, Presenter, Severity, ERROR_DURATION, TOAST_DURATION,
    },
};

const CLEAR: &str = "\x1b[2J\x1b[H";
const BOLD: &str = "\x1b[1m";
const HIGHLIGHT: &str = "\x1b[1;33m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

const COMMANDS_HELP: &str =
    "[r] refresh  [p] pause/resume  [a <address>] change address  [n] notifications  [e] export  [h] history  [q] quit";

#[derive(Debug, Clone, PartialEq)]
struct Notice {
    message: String,
    severity: Severity,
    expires: Instant,
}

/// Everything currently on screen
#[derive(Debug, Clone)]
pub struct Screen {
    stats: Option<DisplayFields>,
    history: Vec<HistoryEntry>,
    refresh_enabled: bool,
    refresh_period: Duration,
    loading: bool,
    highlight_until: Option<Instant>,
    notices: Vec<Notice>,
}

impl Screen {
    pub fn new(refresh_period: Duration) -> Self {
        Self {
            stats: None,
            history: Vec::new(),
            refresh_enabled: true,
            refresh_period,
            loading: false,
            highlight_until: None,
            notices: Vec::new(),
        }
    }

    /// Drop notices and highlight whose time is up
    fn prune(&mut self, now: Instant) {
        self.notices.retain(|n| n.expires > now);
        if self.highlight_until.is_some_and(|until| until <= now) {
            self.highlight_until = None;
        }
    }

    fn highlighted(&self, now: Instant) -> bool {
        self.highlight_until.is_some_and(|until| until > now)
    }

    /// Draw the screen as it looks at `now`, without the clear prefix
    pub fn render(&self, now: Instant) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{BOLD}{APP_TITLE}{RESET}");
        let _ = writeln!(out);

        match &self.stats {
            Some(fields) => {
                let best_share = if self.highlighted(now) {
                    format!("{HIGHLIGHT}{} ★{RESET}", fields.best_share)
                } else {
                    fields.best_share.clone()
                };
                let rows = [
                    ("Address", fields.address.as_str()),
                    ("Workers", fields.workers.as_str()),
                    ("Shares", fields.shares.as_str()),
                    ("Last block", fields.last_block.as_str()),
                    ("Hashrate (1h)", fields.hashrate_1hr.as_str()),
                    ("Hashrate (5m)", fields.hashrate_5m.as_str()),
                    ("Chance per block", fields.chance_per_block.as_str()),
                    ("Chance per day", fields.chance_per_day.as_str()),
                    ("Time estimate", fields.time_estimate.as_str()),
                    ("Best share", best_share.as_str()),
                    ("Difficulty", fields.difficulty.as_str()),
                ];
                for (label, value) in rows {
                    let _ = writeln!(out, "  {:<18}{}", format!("{}:", label), value);
                }
                let _ = writeln!(out);
                let _ = writeln!(out, "{DIM}Last updated: {}{RESET}", fields.last_updated);
            }
            None => {
                let _ = writeln!(out, "  {DIM}No stats fetched yet{RESET}");
                let _ = writeln!(out);
            }
        }

        let _ = write!(
            out,
            "{}",
            refresh_status_text(self.refresh_enabled, self.refresh_period)
        );
        if self.loading {
            let _ = write!(out, "  {CYAN}Loading...{RESET}");
        }
        let _ = writeln!(out);
        let _ = writeln!(out);

        let _ = writeln!(out, "{BOLD}Best share history{RESET}");
        if self.history.is_empty() {
            let _ = writeln!(out, "  {DIM}No best shares recorded yet{RESET}");
        }
        for (i, entry) in self.history.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {:>2}. {:<12}{}",
                i + 1,
                entry.display_value,
                entry.timestamp
            );
        }

        let live: Vec<&Notice> = self.notices.iter().filter(|n| n.expires > now).collect();
        if !live.is_empty() {
            let _ = writeln!(out);
        }
        for notice in live {
            let (color, mark) = match notice.severity {
                Severity::Success => (GREEN, "✓"),
                Severity::Error => (RED, "✗"),
                Severity::Info => (CYAN, "i"),
            };
            let _ = writeln!(out, "{color}[{mark}] {}{RESET}", notice.message);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "{DIM}{COMMANDS_HELP}{RESET}");
        out
    }
}

struct Terminal {
    screen: Screen,
    out: Box<dyn Write + Send>,
}

/// Full-screen presenter writing to stdout (or any writer)
pub struct TerminalPresenter {
    inner: Arc<Mutex<Terminal>>,
}

impl TerminalPresenter {
    pub fn stdout(refresh_period: Duration) -> Self {
        Self::with_writer(refresh_period, Box::new(io::stdout()))
    }

    pub fn with_writer(refresh_period: Duration, out: Box<dyn Write + Send>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Terminal {
                screen: Screen::new(refresh_period),
                out,
            })),
        }
    }

    pub fn screen(&self) -> Option<Screen> {
        self.inner.lock().ok().map(|t| t.screen.clone())
    }

    fn update(&self, change: impl FnOnce(&mut Screen)) {
        Self::update_shared(&self.inner, change);
    }

    fn update_shared(inner: &Mutex<Terminal>, change: impl FnOnce(&mut Screen)) {
        let Ok(mut terminal) = inner.lock() else {
            warn!("Terminal state poisoned, skipping redraw");
            return;
        };
        let now = Instant::now();
        change(&mut terminal.screen);
        terminal.screen.prune(now);

        let frame = terminal.screen.render(now);
        let result = write!(terminal.out, "{CLEAR}{frame}").and_then(|_| terminal.out.flush());
        if let Err(e) = result {
            debug!("Failed to draw screen: {}", e);
        }
    }

    /// Redraw once `after` has elapsed so expired notices disappear on time
    fn redraw_after(&self, after: Duration) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let inner = self.inner.clone();
        runtime.spawn(async move {
            tokio::time::sleep(after).await;
            Self::update_shared(&inner, |_| {});
        });
    }

    fn push_notice(&self, message: &str, severity: Severity, lifetime: Duration) {
        let notice = Notice {
            message: message.to_string(),
            severity,
            expires: Instant::now() + lifetime,
        };
        self.update(|screen| screen.notices.push(notice));
        self.redraw_after(lifetime);
    }
}

impl Presenter for TerminalPresenter {
    fn render_stats(&self, fields: &DisplayFields) {
        let fields = fields.clone();
        self.update(|screen| screen.stats = Some(fields));
    }

    fn render_history(&self, entries: &[HistoryEntry]) {
        let entries = entries.to_vec();
        self.update(|screen| screen.history = entries);
    }

    fn toast(&self, message: &str, severity: Severity) {
        self.push_notice(message, severity, TOAST_DURATION);
    }

    fn error(&self, message: &str) {
        self.push_notice(message, Severity::Error, ERROR_DURATION);
    }

    fn highlight_best_share(&self, duration: Duration) {
        let until = Instant::now() + duration;
        self.update(|screen| screen.highlight_until = Some(until));
        self.redraw_after(duration);
    }

    fn loading(&self, active: bool) {
        self.update(|screen| screen.loading = active);
    }

    fn refresh_status(&self, enabled: bool, period: Duration) {
        self.update(|screen| {
            screen.refresh_enabled = enabled;
            screen.refresh_period = period;
        });
    }
}

/// Desktop notifications through the terminal's OSC 9 escape.
///
/// Terminals have no permission prompt, so asking is answered by the person
/// at the keyboard having typed the command: a pending request is granted,
/// an explicit denial from the config stays denied.
pub struct TerminalNotifier {
    permission: Mutex<Permission>,
}

impl TerminalNotifier {
    pub fn new(permission: Permission) -> Self {
        Self {
            permission: Mutex::new(permission),
        }
    }
}

#[async_trait]
impl Notifier for TerminalNotifier {
    fn permission(&self) -> Permission {
        self.permission
            .lock()
            .map(|p| *p)
            .unwrap_or(Permission::Denied)
    }

    async fn request_permission(&self) -> Permission {
        let Ok(mut permission) = self.permission.lock() else {
            return Permission::Denied;
        };
        if *permission == Permission::NotAsked {
            *permission = Permission::Granted;
            info!("Notifications granted");
        }
        *permission
    }

    fn notify(&self, title: &str, body: &str) -> Result<(), EffectError> {
        let mut out = io::stdout().lock();
        write!(out, "\x1b]9;{}: {}\x07", title, body)
            .and_then(|_| out.flush())
            .map_err(|e| EffectError::Notification(e.to_string()))
    }
}

/// Terminal bell as the audible cue
pub struct TerminalBell {
    enabled: bool,
}

impl TerminalBell {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl AudioCue for TerminalBell {
    fn play(&self) -> Result<(), EffectError> {
        if !self.enabled {
            return Ok(());
        }
        let mut out = io::stdout().lock();
        out.write_all(b"\x07")
            .and_then(|_| out.flush())
            .map_err(|e| EffectError::Audio(e.to_string()))
    }
}
