// Shared mocks for controller tests
//
// The mocks record every interaction so tests can assert on what the
// controller asked of its collaborators.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use voice_call::{
    CallController, CallError, CallEvent, CallResult, CallSdk, CallSnapshot, ControllerConfig,
    CallObserver, CallStatus, EventSink, EventSubscription, MicrophoneAccess, MicrophoneError,
    MicrophoneProbe, SdkError, StartCallConfig, TokenService,
};

#[derive(Default)]
struct SdkState {
    sink: Mutex<Option<EventSink>>,
    subscriptions: AtomicUsize,
    starts: Mutex<Vec<StartCallConfig>>,
    stops: AtomicUsize,
    listeners_removed: AtomicBool,
    start_error: Mutex<Option<String>>,
    stop_error: Mutex<Option<String>>,
    auto_start: AtomicBool,
    start_gate: Mutex<Option<Arc<Notify>>>,
}

/// In-memory calling SDK
#[derive(Clone, Default)]
pub struct MockSdk {
    state: Arc<SdkState>,
}

impl MockSdk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `call_started` from inside `start_call`
    pub fn auto_start(&self, enabled: bool) {
        self.state.auto_start.store(enabled, Ordering::SeqCst);
    }

    /// Hold `start_call` after it is recorded until the notify is triggered
    pub fn hold_start(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.state.start_gate.lock().unwrap() = Some(Arc::clone(&notify));
        notify
    }

    pub fn fail_start(&self, message: &str) {
        *self.state.start_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_stop(&self, message: &str) {
        *self.state.stop_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn emit(&self, event: CallEvent) -> bool {
        match self.state.sink.lock().unwrap().as_ref() {
            Some(sink) => sink.emit(event),
            None => false,
        }
    }

    pub fn start_count(&self) -> usize {
        self.state.starts.lock().unwrap().len()
    }

    pub fn last_start(&self) -> Option<StartCallConfig> {
        self.state.starts.lock().unwrap().last().cloned()
    }

    pub fn stop_count(&self) -> usize {
        self.state.stops.load(Ordering::SeqCst)
    }

    pub fn subscription_count(&self) -> usize {
        self.state.subscriptions.load(Ordering::SeqCst)
    }

    pub fn listeners_removed(&self) -> bool {
        self.state.listeners_removed.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CallSdk for MockSdk {
    async fn start_call(&self, config: &StartCallConfig) -> Result<(), SdkError> {
        self.state.starts.lock().unwrap().push(config.clone());

        let gate = self.state.start_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if let Some(message) = self.state.start_error.lock().unwrap().clone() {
            return Err(SdkError::new(message));
        }

        if self.state.auto_start.load(Ordering::SeqCst) {
            self.emit(CallEvent::CallStarted);
        }

        Ok(())
    }

    async fn stop_call(&self) -> Result<(), SdkError> {
        self.state.stops.fetch_add(1, Ordering::SeqCst);

        match self.state.stop_error.lock().unwrap().clone() {
            Some(message) => Err(SdkError::new(message)),
            None => Ok(()),
        }
    }

    fn subscribe(&self) -> EventSubscription {
        let (sink, subscription) = EventSubscription::channel();
        *self.state.sink.lock().unwrap() = Some(sink);
        self.state.subscriptions.fetch_add(1, Ordering::SeqCst);
        subscription
    }

    fn remove_all_listeners(&self) {
        self.state.sink.lock().unwrap().take();
        self.state.listeners_removed.store(true, Ordering::SeqCst);
    }
}

#[derive(Clone, Debug)]
pub enum MicOutcome {
    Granted,
    Denied,
    Unavailable(String),
}

/// Microphone that answers with a fixed outcome and counts releases
#[derive(Clone)]
pub struct MockMicrophone {
    outcome: Arc<Mutex<MicOutcome>>,
    requests: Arc<AtomicUsize>,
    releases: Arc<AtomicUsize>,
}

impl MockMicrophone {
    pub fn new(outcome: MicOutcome) -> Self {
        Self {
            outcome: Arc::new(Mutex::new(outcome)),
            requests: Arc::new(AtomicUsize::new(0)),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set(&self, outcome: MicOutcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MicrophoneAccess for MockMicrophone {
    async fn request(&self) -> Result<MicrophoneProbe, MicrophoneError> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        let outcome = self.outcome.lock().unwrap().clone();
        match outcome {
            MicOutcome::Granted => {
                let releases = Arc::clone(&self.releases);
                Ok(MicrophoneProbe::new(move || {
                    releases.fetch_add(1, Ordering::SeqCst);
                }))
            }
            MicOutcome::Denied => Err(MicrophoneError::Denied),
            MicOutcome::Unavailable(message) => Err(MicrophoneError::Unavailable(message)),
        }
    }
}

#[derive(Clone, Debug)]
pub enum TokenOutcome {
    Token(String),
    Fail(String),
}

/// Token service with an optional gate that holds requests until opened
#[derive(Clone)]
pub struct MockTokens {
    outcome: Arc<Mutex<TokenOutcome>>,
    gate: Arc<Mutex<Option<Arc<Notify>>>>,
    calls: Arc<AtomicUsize>,
}

impl MockTokens {
    pub fn new(outcome: TokenOutcome) -> Self {
        Self {
            outcome: Arc::new(Mutex::new(outcome)),
            gate: Arc::new(Mutex::new(None)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set(&self, outcome: TokenOutcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    /// Hold every request until the returned notify is triggered
    pub fn hold(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Arc::clone(&notify));
        notify
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TokenService for MockTokens {
    async fn create_web_call(&self) -> CallResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        match self.outcome.lock().unwrap().clone() {
            TokenOutcome::Token(token) => Ok(token),
            TokenOutcome::Fail(message) => Err(CallError::token(message)),
        }
    }
}

/// Observer that records status transitions and ignored events
#[derive(Clone, Default)]
pub struct RecordingObserver {
    transitions: Arc<Mutex<Vec<(CallStatus, CallStatus)>>>,
    ignored: Arc<Mutex<Vec<String>>>,
}

impl RecordingObserver {
    pub fn transitions(&self) -> Vec<(CallStatus, CallStatus)> {
        self.transitions.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<CallStatus> {
        self.transitions().into_iter().map(|(_, to)| to).collect()
    }

    pub fn ignored(&self) -> Vec<String> {
        self.ignored.lock().unwrap().clone()
    }
}

impl CallObserver for RecordingObserver {
    fn status_changed(&self, from: &CallStatus, to: &CallStatus) {
        self.transitions
            .lock()
            .unwrap()
            .push((from.clone(), to.clone()));
    }

    fn event_ignored(&self, event: &CallEvent, _reason: &str) {
        self.ignored.lock().unwrap().push(event.name().to_string());
    }
}

pub struct Harness {
    pub controller: Arc<CallController>,
    pub sdk: MockSdk,
    pub mic: MockMicrophone,
    pub tokens: MockTokens,
    pub observer: RecordingObserver,
}

pub fn harness() -> Harness {
    harness_with(ControllerConfig::default())
}

pub fn harness_with(config: ControllerConfig) -> Harness {
    let observer = RecordingObserver::default();
    let sdk = MockSdk::new();
    let mic = MockMicrophone::new(MicOutcome::Granted);
    let tokens = MockTokens::new(TokenOutcome::Token("test-token".to_string()));

    let controller = Arc::new(CallController::new(
        config,
        Box::new(sdk.clone()),
        Arc::new(mic.clone()),
        Arc::new(tokens.clone()),
        Arc::new(observer.clone()),
    ));

    Harness {
        controller,
        sdk,
        mic,
        tokens,
        observer,
    }
}

/// Wait until the controller publishes a snapshot matching `pred`
pub async fn wait_for(
    controller: &CallController,
    pred: impl FnMut(&CallSnapshot) -> bool,
) -> CallSnapshot {
    let mut rx = controller.subscribe();
    let snapshot = tokio::time::timeout(Duration::from_secs(2), rx.wait_for(pred))
        .await
        .expect("timed out waiting for controller state")
        .expect("controller dropped");
    snapshot.clone()
}

/// Poll until `cond` holds
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("timed out waiting for condition");
}
