use async_trait::async_trait;
use display_utils::{format_grouped, now_timestamp, scale_with_suffix};
use serde::Deserialize;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info, warn};

use crate::{
    detector::Alert,
    error::EffectError,
    history::ShareHistory,
    presenter::{Presenter, Severity},
};

pub const NEW_BEST_SHARE_TITLE: &str = "🎉 New Best Share!";
pub const DIFFICULTY_CHANGED_TITLE: &str = "📊 Difficulty Changed";
pub const APP_TITLE: &str = "BTC Solo Tracker";

/// Whether platform notifications may be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Permission {
    Granted,
    Denied,
    NotAsked,
}

/// Platform notification capability
#[async_trait]
pub trait Notifier: Send + Sync {
    fn permission(&self) -> Permission;

    /// Ask the user for permission; resolves once they have answered
    async fn request_permission(&self) -> Permission;

    fn notify(&self, title: &str, body: &str) -> Result<(), EffectError>;
}

/// Short audible cue played on a new best share
pub trait AudioCue: Send + Sync {
    fn play(&self) -> Result<(), EffectError>;
}

/// Executes the side effects of detected alerts.
///
/// Each effect is best-effort: a failing channel is logged and the remaining
/// ones still run.
pub struct AlertDispatcher {
    presenter: Arc<dyn Presenter>,
    notifier: Arc<dyn Notifier>,
    audio: Arc<dyn AudioCue>,
    highlight: Duration,
}

impl AlertDispatcher {
    pub fn new(
        presenter: Arc<dyn Presenter>,
        notifier: Arc<dyn Notifier>,
        audio: Arc<dyn AudioCue>,
        highlight: Duration,
    ) -> Self {
        Self {
            presenter,
            notifier,
            audio,
            highlight,
        }
    }

    pub fn dispatch(&self, alerts: &[Alert], history: &mut ShareHistory) {
        for alert in alerts {
            match *alert {
                Alert::NewBestShare { value } => self.new_best_share(value, history),
                Alert::DifficultyChanged { value } => self.difficulty_changed(value),
            }
        }
    }

    fn new_best_share(&self, value: f64, history: &mut ShareHistory) {
        let formatted = scale_with_suffix(Some(value));
        info!("🎉 New best share: {}", formatted);

        self.presenter.highlight_best_share(self.highlight);

        if let Err(e) = self.audio.play() {
            debug!("Could not play sound: {}", e);
        }

        self.send_notification(
            NEW_BEST_SHARE_TITLE,
            &format!("New best share: {}", formatted),
        );

        history.append(value, now_timestamp());
        self.presenter.render_history(history.entries());

        self.presenter
            .toast(&format!("New best share: {}!", formatted), Severity::Success);
    }

    fn difficulty_changed(&self, value: f64) {
        let formatted = format_grouped(value, 0);
        info!("Network difficulty changed to {}", formatted);

        self.send_notification(
            DIFFICULTY_CHANGED_TITLE,
            &format!("Network difficulty: {}", formatted),
        );
        self.presenter
            .toast(&format!("Difficulty updated: {}", formatted), Severity::Info);
    }

    /// Show a notification if permission is currently granted
    pub fn send_notification(&self, title: &str, body: &str) {
        if self.notifier.permission() != Permission::Granted {
            debug!("Notifications not permitted, skipping: {}", title);
            return;
        }
        if let Err(e) = self.notifier.notify(title, body) {
            warn!("Failed to send notification: {}", e);
        }
    }
}
