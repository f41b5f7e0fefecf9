//! Transport seam of the hub client.
//!
//! A transport opens one connection per `connect` call and hands back two
//! halves: an [`Invoker`] for client-to-server calls and an inbound channel
//! of named events. The inbound channel closing means the connection is gone.

use super::HubError;
use bistro_core::CartToken;
use serde_json::Value;
use std::future::Future;
use tokio::sync::mpsc;

/// Capacity of the inbound event channel.
pub const INBOUND_CAPACITY: usize = 256;

/// Credentials sent when opening a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Handshake {
    /// Bearer token; only set when present and unexpired.
    pub access_token: Option<String>,
    pub cart_token: Option<CartToken>,
}

/// A named event pushed by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub target: String,
    pub payload: Value,
}

impl InboundMessage {
    pub fn new(target: impl Into<String>, payload: Value) -> Self {
        Self {
            target: target.into(),
            payload,
        }
    }
}

/// An open connection.
pub struct Link<I> {
    pub invoker: I,
    pub inbound: mpsc::Receiver<InboundMessage>,
}

/// Send side of an open connection.
pub trait Invoker: Clone + Send + Sync + 'static {
    /// Call a server-side method.
    fn invoke(
        &self,
        target: &str,
        arguments: Vec<Value>,
    ) -> impl Future<Output = Result<(), HubError>> + Send;

    /// Tear the connection down. The inbound channel closes afterwards.
    fn close(&self);
}

/// Opens connections to the hub.
pub trait Transport: Send + Sync + 'static {
    type Invoker: Invoker;

    fn connect(
        &self,
        handshake: &Handshake,
    ) -> impl Future<Output = Result<Link<Self::Invoker>, HubError>> + Send;
}
