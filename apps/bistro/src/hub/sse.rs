//! # Server-Sent Events Transport
//!
//! - Receive: `GET {hub}?cartToken=...` with `Accept: text/event-stream`.
//!   Each SSE `event:` is a hub event name (default `message`) and its
//!   `data:` lines, joined with `\n`, are the JSON payload.
//! - Send: `POST {hub}/invoke` with `{ target, arguments, cartToken }`.

use super::{Handshake, HubError, INBOUND_CAPACITY, InboundMessage, Invoker, Link, Transport};
use bistro_core::CartToken;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

const DEFAULT_EVENT: &str = "message";

// =============================================================================
// PARSER
// =============================================================================

/// One dispatched SSE event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
}

impl SseFrame {
    /// JSON payload; empty data is `null` and data that is not JSON is
    /// delivered as a string.
    #[must_use]
    pub fn into_message(self) -> InboundMessage {
        if self.data.trim().is_empty() {
            return InboundMessage::new(self.event, Value::Null);
        }
        let payload = match serde_json::from_str::<Value>(&self.data) {
            Ok(value) => value,
            Err(_) => Value::String(self.data),
        };
        InboundMessage::new(self.event, payload)
    }
}

/// Incremental `text/event-stream` parser. Chunks may split lines anywhere,
/// including inside a UTF-8 sequence or a CRLF pair. Lines end with LF, CRLF
/// or a bare CR.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
    /// The last chunk ended in CR; an LF opening the next one belongs to it.
    after_cr: bool,
}

impl SseParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes; returns every event completed by this chunk.
    pub fn feed(&mut self, mut chunk: &[u8]) -> Vec<SseFrame> {
        if self.after_cr && !chunk.is_empty() {
            self.after_cr = false;
            if let Some(rest) = chunk.strip_prefix(b"\n") {
                chunk = rest;
            }
        }
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(end) = self.buffer.iter().position(|b| matches!(b, b'\n' | b'\r')) {
            let mut consumed = end + 1;
            if self.buffer[end] == b'\r' {
                match self.buffer.get(end + 1) {
                    Some(b'\n') => consumed += 1,
                    Some(_) => {}
                    None => self.after_cr = true,
                }
            }
            let raw: Vec<u8> = self.buffer.drain(..consumed).collect();
            let line = String::from_utf8_lossy(&raw[..end]).into_owned();
            if let Some(frame) = self.line(&line) {
                frames.push(frame);
            }
        }
        frames
    }

    fn line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            // id and retry carry nothing the hub client uses
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take().filter(|e| !e.is_empty());
        if self.data.is_empty() {
            return None;
        }
        let data = self.data.join("\n");
        self.data.clear();
        Some(SseFrame {
            event: event.unwrap_or_else(|| DEFAULT_EVENT.to_string()),
            data,
        })
    }
}

// =============================================================================
// TRANSPORT
// =============================================================================

/// Hub transport over Server-Sent Events.
#[derive(Debug, Clone)]
pub struct SseTransport {
    http: reqwest::Client,
    hub_url: String,
}

impl SseTransport {
    /// `connect_timeout` bounds the handshake; the stream itself has no timeout.
    pub fn new(hub_url: impl Into<String>, connect_timeout: Duration) -> Result<Self, HubError> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| HubError::Connect(e.to_string()))?;
        Ok(Self::with_client(http, hub_url))
    }

    pub fn with_client(http: reqwest::Client, hub_url: impl Into<String>) -> Self {
        Self {
            http,
            hub_url: hub_url.into().trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn hub_url(&self) -> &str {
        &self.hub_url
    }
}

impl Transport for SseTransport {
    type Invoker = SseInvoker;

    async fn connect(&self, handshake: &Handshake) -> Result<Link<SseInvoker>, HubError> {
        let mut request = self
            .http
            .get(&self.hub_url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache");
        if let Some(cart) = &handshake.cart_token {
            request = request.query(&[("cartToken", cart.as_str())]);
        }
        if let Some(token) = &handshake.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| HubError::Connect(format!("{}: {}", self.hub_url, e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(HubError::Connect(format!(
                "{}: handshake rejected with status {}",
                self.hub_url, status
            )));
        }

        let (tx, rx) = mpsc::channel(INBOUND_CAPACITY);
        let reader = tokio::spawn(read_events(response, tx));
        tracing::debug!(hub = %self.hub_url, "Event stream open");

        Ok(Link {
            invoker: SseInvoker {
                http: self.http.clone(),
                invoke_url: format!("{}/invoke", self.hub_url),
                access_token: handshake.access_token.clone(),
                cart_token: handshake.cart_token.clone(),
                reader: Arc::new(reader.abort_handle()),
            },
            inbound: rx,
        })
    }
}

async fn read_events(response: reqwest::Response, tx: mpsc::Sender<InboundMessage>) {
    let mut stream = response.bytes_stream();
    let mut parser = SseParser::new();
    while let Some(chunk) = stream.next().await {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "Event stream error");
                return;
            }
        };
        for frame in parser.feed(&bytes) {
            if tx.send(frame.into_message()).await.is_err() {
                return;
            }
        }
    }
    tracing::debug!("Event stream ended");
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InvokeBody<'a> {
    target: &'a str,
    arguments: Vec<Value>,
    cart_token: Option<&'a CartToken>,
}

/// Send half of an SSE connection.
#[derive(Debug, Clone)]
pub struct SseInvoker {
    http: reqwest::Client,
    invoke_url: String,
    access_token: Option<String>,
    cart_token: Option<CartToken>,
    reader: Arc<AbortHandle>,
}

impl Invoker for SseInvoker {
    async fn invoke(&self, target: &str, arguments: Vec<Value>) -> Result<(), HubError> {
        if self.reader.is_finished() {
            return Err(HubError::NotConnected);
        }
        let body = InvokeBody {
            target,
            arguments,
            cart_token: self.cart_token.as_ref(),
        };
        let mut request = self.http.post(&self.invoke_url).json(&body);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| HubError::Invoke(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(HubError::Invoke(format!(
                "{} answered with status {}",
                target, status
            )));
        }
        Ok(())
    }

    fn close(&self) {
        self.reader.abort();
    }
}

// =============================================================================
// TESTS
// =============================================================================
