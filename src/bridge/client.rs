use super::messages::{CommandReply, PermissionReply, Subjects};
use crate::error::{MicrophoneError, SdkError};
use crate::microphone::{MicrophoneAccess, MicrophoneProbe};
use crate::sdk::{CallEvent, CallSdk, EventSubscription, StartCallConfig};
use anyhow::{Context, Result};
use async_nats::{Client, Subscriber};
use futures::stream::StreamExt;
use std::sync::{Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Connection to the NATS bridge process hosting the calling SDK
#[derive(Clone)]
pub struct NatsBridge {
    client: Client,
    subjects: Subjects,
}

impl NatsBridge {
    /// Connect to NATS server
    pub async fn connect(url: &str, bridge_id: &str) -> Result<Self> {
        info!("Connecting to call bridge '{}' via NATS at {}", bridge_id, url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self {
            client,
            subjects: Subjects::for_bridge(bridge_id),
        })
    }

    /// SDK handle for a call controller to own.
    ///
    /// The events subject is subscribed here, before any listener is
    /// attached, so events published in between are buffered rather than
    /// lost.
    pub async fn call_sdk(&self) -> Result<NatsCallSdk> {
        let events = self
            .client
            .subscribe(self.subjects.events.clone())
            .await
            .with_context(|| format!("Failed to subscribe to {}", self.subjects.events))?;

        info!("Subscribed to {}", self.subjects.events);

        Ok(NatsCallSdk {
            bridge: self.clone(),
            events: Mutex::new(Some(events)),
            listeners: Mutex::new(Vec::new()),
        })
    }

    pub fn microphone(&self) -> NatsMicrophone {
        NatsMicrophone {
            bridge: self.clone(),
        }
    }

    pub fn subjects(&self) -> &Subjects {
        &self.subjects
    }

    async fn round_trip<T: serde::de::DeserializeOwned>(
        &self,
        subject: &str,
        payload: Vec<u8>,
    ) -> Result<T> {
        let reply = self
            .client
            .request(subject.to_string(), payload.into())
            .await
            .with_context(|| format!("Bridge request to {} failed", subject))?;

        serde_json::from_slice(&reply.payload)
            .with_context(|| format!("Malformed bridge reply on {}", subject))
    }

    async fn command(&self, subject: &str, payload: Vec<u8>, action: &str) -> Result<(), SdkError> {
        let reply: CommandReply = self
            .round_trip(subject, payload)
            .await
            .map_err(|e| SdkError::new(format!("{:#}", e)))?;

        reply.into_result(action)
    }
}

/// Calling SDK driven through the bridge
pub struct NatsCallSdk {
    bridge: NatsBridge,
    /// Subscription opened by `call_sdk`, handed to the first listener
    events: Mutex<Option<Subscriber>>,
    listeners: Mutex<Vec<JoinHandle<()>>>,
}

#[async_trait::async_trait]
impl CallSdk for NatsCallSdk {
    async fn start_call(&self, config: &StartCallConfig) -> Result<(), SdkError> {
        let payload = serde_json::to_vec(config)
            .map_err(|e| SdkError::new(format!("Failed to encode start config: {}", e)))?;

        self.bridge
            .command(&self.bridge.subjects.start, payload, "call start")
            .await
    }

    async fn stop_call(&self) -> Result<(), SdkError> {
        self.bridge
            .command(&self.bridge.subjects.stop, b"{}".to_vec(), "call stop")
            .await
    }

    fn subscribe(&self) -> EventSubscription {
        let (sink, subscription) = EventSubscription::channel();
        let subject = self.bridge.subjects.events.clone();

        let Some(mut subscriber) = self
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            // Dropping the sink closes the returned subscription
            warn!("Events on {} already have a listener", subject);
            return subscription;
        };

        let listener = tokio::spawn(async move {
            while let Some(msg) = subscriber.next().await {
                match serde_json::from_slice::<CallEvent>(&msg.payload) {
                    Ok(event) => {
                        if !sink.emit(event) {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to parse call event: {}", e);
                    }
                }
            }

            info!("Event listener on {} stopped", subject);
        });

        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);

        subscription
    }

    fn remove_all_listeners(&self) {
        let listeners: Vec<_> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();

        for listener in listeners {
            listener.abort();
        }
    }
}

/// Microphone permission probe performed by the bridge
pub struct NatsMicrophone {
    bridge: NatsBridge,
}

#[async_trait::async_trait]
impl MicrophoneAccess for NatsMicrophone {
    async fn request(&self) -> Result<MicrophoneProbe, MicrophoneError> {
        let reply: PermissionReply = self
            .bridge
            .round_trip(&self.bridge.subjects.microphone, b"{}".to_vec())
            .await
            .map_err(|e| MicrophoneError::Unavailable(format!("{:#}", e)))?;

        reply.into_result()?;

        let client = self.bridge.client.clone();
        let subject = self.bridge.subjects.microphone_release.clone();

        Ok(MicrophoneProbe::new(move || {
            let Ok(runtime) = tokio::runtime::Handle::try_current() else {
                warn!("No runtime to release microphone probe on {}", subject);
                return;
            };
            runtime.spawn(async move {
                if let Err(e) = client.publish(subject.clone(), Vec::<u8>::new().into()).await {
                    warn!("Failed to release microphone probe on {}: {}", subject, e);
                }
            });
        }))
    }
}

impl Drop for NatsCallSdk {
    fn drop(&mut self) {
        self.remove_all_listeners();
    }
}
