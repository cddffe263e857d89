use super::status::CallStatus;
use crate::error::{CallError, CallResult, ErrorKind};
use crate::sdk::CallEvent;
use crate::transcript::normalize_update;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Derived call state exposed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSnapshot {
    /// Current phase
    pub status: CallStatus,

    /// Human-readable rendering of `status`
    pub status_text: String,

    /// True strictly between `call_started` and `call_ended` (or stop)
    pub is_active: bool,

    /// Latest normalized transcript
    pub transcript: String,

    /// Whether the agent is currently speaking
    pub agent_talking: bool,

    /// Kind of the most recent failure, cleared when a new call starts
    pub last_error: Option<ErrorKind>,

    /// When this snapshot was produced
    pub updated_at: DateTime<Utc>,
}

/// Result of applying one SDK event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Applied,
    /// Event recognized but carried nothing to change
    Unchanged,
    Ignored(&'static str),
    /// Error during an active call; watchdog armed for this epoch
    ArmWatchdog(u64),
}

/// How a finished `start()` relates to the current generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartCompletion {
    Current,
    /// A stop or newer start superseded this one
    Stale { abandon_session: bool },
}

/// Mutable call session state.
///
/// Every transition goes through these methods; the controller only
/// serializes access and publishes snapshots.
#[derive(Debug, Default)]
pub struct SessionState {
    status: CallStatus,
    is_active: bool,
    transcript: String,
    agent_talking: bool,
    last_error: Option<ErrorKind>,

    /// Bumped by every start and stop
    generation: u64,

    /// Generation whose session events are expected
    expected: Option<u64>,

    /// A start() is suspended somewhere before completion
    starting: bool,

    /// Generation whose SDK session is opening or being torn down.
    /// Survives stop; no new start begins until it clears.
    sdk_start: Option<u64>,

    /// Bumped whenever a pending error watchdog must be invalidated
    error_epoch: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &CallStatus {
        &self.status
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn agent_talking(&self) -> bool {
        self.agent_talking
    }

    pub fn is_starting(&self) -> bool {
        self.starting
    }

    pub fn sdk_start_pending(&self) -> bool {
        self.sdk_start.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshot(&self) -> CallSnapshot {
        CallSnapshot {
            status: self.status.clone(),
            status_text: self.status.to_string(),
            is_active: self.is_active,
            transcript: self.transcript.clone(),
            agent_talking: self.agent_talking,
            last_error: self.last_error,
            updated_at: Utc::now(),
        }
    }

    /// Open a new start generation, or `None` if a call is active, starting,
    /// or an earlier SDK session is still opening
    pub fn begin_start(&mut self) -> Option<u64> {
        if self.is_active || self.starting || self.sdk_start.is_some() {
            return None;
        }

        self.generation += 1;
        self.expected = Some(self.generation);
        self.starting = true;
        self.last_error = None;
        self.status = CallStatus::RequestingPermission;

        Some(self.generation)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Move a pending start to `status` if it is still current
    pub fn advance(&mut self, generation: u64, status: CallStatus) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.status = status;
        true
    }

    /// Claim the SDK for `generation` right before `start_call`
    pub fn begin_sdk_start(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.sdk_start = Some(generation);
        true
    }

    /// Release the SDK claim once the session is live or torn down
    pub fn end_sdk_start(&mut self, generation: u64) {
        if self.sdk_start == Some(generation) {
            self.sdk_start = None;
        }
    }

    /// Settle a start. A stale start that opened a session keeps its SDK
    /// claim until the caller has stopped that session.
    pub fn finish_start(&mut self, generation: u64, result: &CallResult<bool>) -> StartCompletion {
        if !self.is_current(generation) {
            let opened = matches!(result, Ok(true));
            if !opened {
                self.end_sdk_start(generation);
            }
            return StartCompletion::Stale {
                abandon_session: opened,
            };
        }

        self.starting = false;
        self.end_sdk_start(generation);

        match result {
            Ok(_) => {
                // call_started may already have arrived, and a call_ended or
                // error may already have replaced the pending status
                if !self.is_active && self.status.is_pending() {
                    self.status = CallStatus::Connecting;
                }
            }
            Err(err) => {
                self.is_active = false;
                self.expected = None;
                self.record_error(err);
            }
        }

        StartCompletion::Current
    }

    /// Invalidate any outstanding start and watchdog
    pub fn begin_stop(&mut self) {
        self.generation += 1;
        self.expected = None;
        self.starting = false;
        self.error_epoch += 1;
    }

    /// Stop always leaves the session inactive, whatever the SDK reported
    pub fn finish_stop(&mut self) {
        self.is_active = false;
        self.agent_talking = false;
        self.status = CallStatus::Stopped;
    }

    pub fn apply_event(&mut self, event: &CallEvent) -> EventOutcome {
        match event {
            CallEvent::CallStarted => {
                if self.expected.is_none() {
                    return EventOutcome::Ignored("no call start is outstanding");
                }
                self.error_epoch += 1;
                self.is_active = true;
                self.status = CallStatus::Active;
                EventOutcome::Applied
            }
            CallEvent::CallEnded => {
                self.error_epoch += 1;
                let in_call = self.is_active || self.expected.is_some();
                self.is_active = false;
                self.agent_talking = false;
                self.expected = None;
                if !in_call {
                    return EventOutcome::Ignored("no call in progress");
                }
                self.status = CallStatus::Ended;
                EventOutcome::Applied
            }
            CallEvent::AgentStartTalking => {
                self.agent_talking = true;
                EventOutcome::Applied
            }
            CallEvent::AgentStopTalking => {
                self.agent_talking = false;
                EventOutcome::Applied
            }
            CallEvent::Update(update) => match normalize_update(update) {
                Some(text) => {
                    self.transcript = text;
                    EventOutcome::Applied
                }
                None => EventOutcome::Unchanged,
            },
            CallEvent::Error { message } => {
                self.record_error(&CallError::runtime(message.as_deref()));
                if self.is_active {
                    self.error_epoch += 1;
                    EventOutcome::ArmWatchdog(self.error_epoch)
                } else {
                    EventOutcome::Applied
                }
            }
        }
    }

    /// Expire an error watchdog; true if it deactivated the call
    pub fn fire_watchdog(&mut self, epoch: u64) -> bool {
        if epoch != self.error_epoch || !self.is_active {
            return false;
        }
        self.is_active = false;
        self.agent_talking = false;
        self.expected = None;
        true
    }

    fn record_error(&mut self, err: &CallError) {
        self.status = CallStatus::from_error(err);
        self.last_error = Some(err.kind());
    }
}
