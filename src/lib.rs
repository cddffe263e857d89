pub mod bridge;
pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod microphone;
pub mod observer;
pub mod sdk;
pub mod token;
pub mod transcript;

pub use bridge::{NatsBridge, NatsCallSdk, NatsMicrophone};
pub use config::Config;
pub use controller::{CallController, CallSnapshot, CallStatus, ControllerConfig};
pub use error::{CallError, CallResult, ErrorKind, MicrophoneError, SdkError};
pub use http::{create_router, AppState};
pub use microphone::{MicrophoneAccess, MicrophoneProbe};
pub use observer::{CallObserver, NoopObserver, TracingObserver};
pub use sdk::{CallEvent, CallSdk, EventSink, EventSubscription, StartCallConfig};
pub use token::{HttpTokenService, TokenResponse, TokenService};
pub use transcript::{normalize_update, Speaker, Utterance};
