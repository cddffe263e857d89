//! NATS bridge to the process hosting the calling SDK and microphone
//!
//! Subjects (`<id>` is the bridge id):
//! - `call.<id>.microphone` - permission probe (request/reply)
//! - `call.<id>.microphone.release` - probe release (publish)
//! - `call.<id>.start` / `call.<id>.stop` - session control (request/reply)
//! - `call.<id>.events` - SDK events (subscribe)

pub mod client;
pub mod messages;

pub use client::{NatsBridge, NatsCallSdk, NatsMicrophone};
pub use messages::{CommandReply, PermissionReply, Subjects};
