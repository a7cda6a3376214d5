//! Recording fakes for the monitor's capabilities.

use async_trait::async_trait;
use stats::{MetricRecord, MetricSource, RawValue, StatsClientError};
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};
use tokio::sync::oneshot;

use crate::{
    alerts::{AudioCue, Notifier, Permission},
    error::EffectError,
    history::HistoryEntry,
    presenter::{DisplayFields, Presenter, Severity},
};

pub const TEST_ADDRESS: &str = "bc1qtest";

pub fn record(best_share: f64, difficulty: f64) -> MetricRecord {
    MetricRecord {
        address: Some(TEST_ADDRESS.to_string()),
        best_share: Some(RawValue::Number(best_share)),
        difficulty: Some(RawValue::Number(difficulty)),
        ..Default::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PresenterCall {
    Stats(DisplayFields),
    History(Vec<HistoryEntry>),
    Toast(String, Severity),
    Error(String),
    Highlight(Duration),
    Loading(bool),
    Status(bool),
}

#[derive(Default)]
pub struct RecordingPresenter {
    calls: Mutex<Vec<PresenterCall>>,
}

impl RecordingPresenter {
    fn push(&self, call: PresenterCall) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<PresenterCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PresenterCall::Error(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn toasts(&self) -> Vec<(String, Severity)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PresenterCall::Toast(message, severity) => Some((message, severity)),
                _ => None,
            })
            .collect()
    }

    pub fn rendered_stats(&self) -> Vec<DisplayFields> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PresenterCall::Stats(fields) => Some(fields),
                _ => None,
            })
            .collect()
    }
}

impl Presenter for RecordingPresenter {
    fn render_stats(&self, fields: &DisplayFields) {
        self.push(PresenterCall::Stats(fields.clone()));
    }

    fn render_history(&self, entries: &[HistoryEntry]) {
        self.push(PresenterCall::History(entries.to_vec()));
    }

    fn toast(&self, message: &str, severity: Severity) {
        self.push(PresenterCall::Toast(message.to_string(), severity));
    }

    fn error(&self, message: &str) {
        self.push(PresenterCall::Error(message.to_string()));
    }

    fn highlight_best_share(&self, duration: Duration) {
        self.push(PresenterCall::Highlight(duration));
    }

    fn loading(&self, active: bool) {
        self.push(PresenterCall::Loading(active));
    }

    fn refresh_status(&self, enabled: bool, _period: Duration) {
        self.push(PresenterCall::Status(enabled));
    }
}

pub struct FakeNotifier {
    permission: Mutex<Permission>,
    on_request: Permission,
    fail: bool,
    sent: Mutex<Vec<(String, String)>>,
}

impl FakeNotifier {
    pub fn new(permission: Permission) -> Self {
        Self {
            permission: Mutex::new(permission),
            on_request: Permission::Granted,
            fail: false,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Permission granted, but every dispatch fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Permission::Granted)
        }
    }

    pub fn answering(permission: Permission, on_request: Permission) -> Self {
        Self {
            on_request,
            ..Self::new(permission)
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    fn permission(&self) -> Permission {
        *self.permission.lock().unwrap()
    }

    async fn request_permission(&self) -> Permission {
        let mut permission = self.permission.lock().unwrap();
        if *permission == Permission::NotAsked {
            *permission = self.on_request;
        }
        *permission
    }

    fn notify(&self, title: &str, body: &str) -> Result<(), EffectError> {
        if self.fail {
            return Err(EffectError::Notification("blocked".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeAudio {
    plays: AtomicUsize,
    fail: bool,
}

impl FakeAudio {
    pub fn failing() -> Self {
        Self {
            plays: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }
}

impl AudioCue for FakeAudio {
    fn play(&self) -> Result<(), EffectError> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EffectError::Audio("autoplay blocked".to_string()));
        }
        Ok(())
    }
}

/// Answers fetches from a queue of canned responses, in call order
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<MetricRecord, StatsClientError>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new(responses: Vec<Result<MetricRecord, StatsClientError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetricSource for ScriptedSource {
    async fn fetch(&self, address: &str) -> Result<MetricRecord, StatsClientError> {
        self.requests.lock().unwrap().push(address.to_string());
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(StatsClientError::Decode("no scripted response".to_string())))
    }
}

/// Holds every fetch open until the test releases it, in whatever order it likes
#[derive(Default)]
pub struct GatedSource {
    gates: Mutex<Vec<oneshot::Sender<Result<MetricRecord, StatsClientError>>>>,
}

impl GatedSource {
    pub fn pending(&self) -> usize {
        self.gates.lock().unwrap().len()
    }

    /// Take the gates of all fetches issued so far, in issue order
    pub fn take_gates(&self) -> Vec<oneshot::Sender<Result<MetricRecord, StatsClientError>>> {
        std::mem::take(&mut *self.gates.lock().unwrap())
    }
}

#[async_trait]
impl MetricSource for GatedSource {
    async fn fetch(&self, _address: &str) -> Result<MetricRecord, StatsClientError> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push(tx);
        rx.await
            .unwrap_or_else(|_| Err(StatsClientError::Decode("gate dropped".to_string())))
    }
}
