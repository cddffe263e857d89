use super::config::ControllerConfig;
use super::state::{CallSnapshot, EventOutcome, SessionState, StartCompletion};
use super::status::CallStatus;
use crate::error::{CallError, CallResult};
use crate::microphone::MicrophoneAccess;
use crate::observer::CallObserver;
use crate::sdk::{CallSdk, EventSubscription};
use crate::token::TokenService;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

/// State shared between the controller, its event task and the error watchdog
struct Shared {
    state: Mutex<SessionState>,
    snapshot_tx: watch::Sender<CallSnapshot>,
    observer: Arc<dyn CallObserver>,
    watchdog: StdMutex<Option<JoinHandle<()>>>,
    error_grace: Duration,
}

impl Shared {
    /// Mutate the session state, then report and publish any change
    async fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut state = self.state.lock().await;
        let before = state.status().clone();
        let result = f(&mut *state);

        if *state.status() != before {
            self.observer.status_changed(&before, state.status());
        }
        self.snapshot_tx.send_replace(state.snapshot());

        result
    }

    fn arm_watchdog(self: &Arc<Self>, epoch: u64, sdk: Arc<dyn CallSdk>) {
        let shared = Arc::clone(self);
        let grace = self.error_grace;

        let task = tokio::spawn(async move {
            tokio::time::sleep(grace).await;

            if !shared.update(|state| state.fire_watchdog(epoch)).await {
                return;
            }

            shared
                .observer
                .note("No call_ended after SDK error, treating session as ended");
            if let Err(e) = sdk.stop_call().await {
                shared.observer.action_failed(
                    "stop",
                    &CallError::Stop { message: e.message },
                );
            }
        });

        let previous = lock(&self.watchdog).replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    fn cancel_watchdog(&self) {
        if let Some(task) = lock(&self.watchdog).take() {
            task.abort();
        }
    }
}

fn lock<T>(mutex: &StdMutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Supervises one realtime call at a time on behalf of a presentation layer.
///
/// The controller exclusively owns the SDK handle, registers exactly one
/// event listener on it at construction and detaches it on `dispose()` or
/// drop. Must be created inside a tokio runtime.
pub struct CallController {
    config: ControllerConfig,
    shared: Arc<Shared>,
    sdk: StdMutex<Option<Arc<dyn CallSdk>>>,
    microphone: Arc<dyn MicrophoneAccess>,
    tokens: Arc<dyn TokenService>,
    event_task: StdMutex<Option<JoinHandle<()>>>,
}

impl CallController {
    pub fn new(
        config: ControllerConfig,
        sdk: Box<dyn CallSdk>,
        microphone: Arc<dyn MicrophoneAccess>,
        tokens: Arc<dyn TokenService>,
        observer: Arc<dyn CallObserver>,
    ) -> Self {
        let sdk: Arc<dyn CallSdk> = Arc::from(sdk);
        let state = SessionState::new();
        let (snapshot_tx, _) = watch::channel(state.snapshot());

        let shared = Arc::new(Shared {
            state: Mutex::new(state),
            snapshot_tx,
            observer,
            watchdog: StdMutex::new(None),
            error_grace: config.error_grace,
        });

        let subscription = sdk.subscribe();
        let event_task = tokio::spawn(Self::pump_events(
            Arc::clone(&shared),
            Arc::clone(&sdk),
            subscription,
        ));

        shared.observer.note(&format!("Call controller '{}' ready", config.name));

        Self {
            config,
            shared,
            sdk: StdMutex::new(Some(sdk)),
            microphone,
            tokens,
            event_task: StdMutex::new(Some(event_task)),
        }
    }

    /// Handle SDK events strictly in emission order
    async fn pump_events(
        shared: Arc<Shared>,
        sdk: Arc<dyn CallSdk>,
        mut subscription: EventSubscription,
    ) {
        while let Some(event) = subscription.next().await {
            shared.observer.event_received(&event);

            match shared.update(|state| state.apply_event(&event)).await {
                EventOutcome::Ignored(reason) => shared.observer.event_ignored(&event, reason),
                EventOutcome::ArmWatchdog(epoch) => shared.arm_watchdog(epoch, Arc::clone(&sdk)),
                EventOutcome::Applied | EventOutcome::Unchanged => {}
            }
        }

        shared.observer.note("SDK event stream closed");
    }

    /// Start a new call.
    ///
    /// Failures are converted into the snapshot's status; nothing is
    /// returned to the caller. Does nothing while a call is active, another
    /// start is still pending, or a stopped start's SDK session is still
    /// opening.
    pub async fn start(&self) {
        let Some(generation) = self.shared.update(|state| state.begin_start()).await else {
            self.shared
                .observer
                .note("Start ignored: a call is already active or starting");
            return;
        };

        let result = self.run_start(generation).await;
        if let Err(err) = &result {
            self.shared.observer.action_failed("start", err);
        }

        let completion = self
            .shared
            .update(|state| state.finish_start(generation, &result))
            .await;

        if completion == (StartCompletion::Stale { abandon_session: true }) {
            self.shared
                .observer
                .note("Start resolved after stop, stopping abandoned session");
            if let Some(sdk) = self.sdk() {
                if let Err(e) = sdk.stop_call().await {
                    self.shared
                        .observer
                        .action_failed("stop", &CallError::Stop { message: e.message });
                }
            }
            self.shared
                .update(|state| state.end_sdk_start(generation))
                .await;
        }
    }

    /// Returns whether an SDK session was opened for this generation
    async fn run_start(&self, generation: u64) -> CallResult<bool> {
        let sdk = self
            .sdk()
            .ok_or_else(|| CallError::session_start("Call client has been disposed"))?;

        // Only surfaces the permission prompt; the probe is released at once
        // and on every early return
        let probe = self.microphone.request().await?;
        probe.release();

        if !self.advance(generation, CallStatus::CreatingSession).await {
            return Ok(false);
        }

        let token = self.tokens.create_web_call().await?;

        if !self
            .shared
            .update(|state| state.begin_sdk_start(generation))
            .await
        {
            return Ok(false);
        }

        sdk.start_call(&self.config.start_config(token))
            .await
            .map_err(|e| CallError::session_start(e.message))?;

        Ok(true)
    }

    async fn advance(&self, generation: u64, status: CallStatus) -> bool {
        self.shared
            .update(|state| state.advance(generation, status))
            .await
    }

    /// Stop the current call.
    ///
    /// Safe to call when idle or after dispose. The session is always
    /// reported inactive afterwards, even if the SDK stop fails.
    pub async fn stop(&self) {
        self.shared.update(|state| state.begin_stop()).await;
        self.shared.cancel_watchdog();

        if let Some(sdk) = self.sdk() {
            if let Err(e) = sdk.stop_call().await {
                self.shared
                    .observer
                    .action_failed("stop", &CallError::Stop { message: e.message });
            }
        }

        self.shared.update(|state| state.finish_stop()).await;
    }

    /// Detach SDK listeners and cancel background tasks. Idempotent.
    pub fn dispose(&self) {
        if let Some(sdk) = lock(&self.sdk).take() {
            sdk.remove_all_listeners();
            self.shared.observer.note("Call controller disposed");
        }

        if let Some(task) = lock(&self.event_task).take() {
            task.abort();
        }

        self.shared.cancel_watchdog();
    }

    pub fn is_disposed(&self) -> bool {
        lock(&self.sdk).is_none()
    }

    fn sdk(&self) -> Option<Arc<dyn CallSdk>> {
        lock(&self.sdk).clone()
    }

    /// Current derived state
    pub fn snapshot(&self) -> CallSnapshot {
        self.shared.snapshot_tx.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<CallSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    pub fn status(&self) -> CallStatus {
        self.shared.snapshot_tx.borrow().status.clone()
    }

    pub fn is_active(&self) -> bool {
        self.shared.snapshot_tx.borrow().is_active
    }

    pub fn transcript(&self) -> String {
        self.shared.snapshot_tx.borrow().transcript.clone()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }
}

impl Drop for CallController {
    fn drop(&mut self) {
        self.dispose();
    }
}
