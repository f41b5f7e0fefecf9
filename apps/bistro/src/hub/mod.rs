//! # Hub Client
//!
//! One logical connection to the server-push channel, fanned out to any
//! number of local subscribers.
//!
//! ## Lifecycle
//!
//! ```text
//! Disconnected ──start──▶ Connecting ──ok──▶ Connected
//!                             │                  │ stream ended
//!                             │ error            ▼
//!                             └──────────▶ Reconnecting{attempt} ──ok──▶ Connected
//!                                                │ retries exhausted
//!                                                ▼
//!                                         Failed{reason}
//! ```
//!
//! - `start` is single-flight: concurrent callers share one connection attempt,
//!   and starting while connected is a no-op.
//! - Subscriptions live in the client, not the connection, so they survive
//!   every reconnect.
//! - `stop` is never treated as a connection loss.
//! - The state is published on a watch channel so a front-end can render
//!   the terminal failure.

mod registry;
mod retry;
pub mod sse;
mod transport;

pub use registry::{Handler, Subscription};
pub use retry::RetryPolicy;
pub use sse::{SseFrame, SseInvoker, SseParser, SseTransport};
pub use transport::{Handshake, INBOUND_CAPACITY, InboundMessage, Invoker, Link, Transport};

use crate::auth;
use bistro_core::CartToken;
use registry::Registry;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

// =============================================================================
// ERRORS & STATE
// =============================================================================

/// Errors raised by the hub client and its transports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    /// No connection is open.
    #[error("Not connected to the hub")]
    NotConnected,

    /// A single connection attempt failed.
    #[error("Hub connection failed: {0}")]
    Connect(String),

    /// Every attempt allowed by the retry policy failed. Terminal.
    #[error("Hub connection failed after {attempts} attempts: {reason}")]
    Failed { attempts: u32, reason: String },

    /// `stop` was called while connecting.
    #[error("Hub connection was stopped")]
    Cancelled,

    /// A remote call could not be delivered.
    #[error("Hub invoke failed: {0}")]
    Invoke(String),
}

/// Observable connection state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// Re-establishing the connection; `attempt` counts failed attempts so far.
    Reconnecting { attempt: u32 },
    /// Retries exhausted. Only an explicit `start` or `reconnect` leaves this state.
    Failed { reason: String },
}

impl ConnectionState {
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => f.write_str("disconnected"),
            Self::Connecting => f.write_str("connecting"),
            Self::Connected => f.write_str("connected"),
            Self::Reconnecting { attempt } => write!(f, "reconnecting (attempt {})", attempt),
            Self::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// Tuning for connection management.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubOptions {
    pub retry: RetryPolicy,
    /// Pause between stop and start in [`HubClient::reconnect`].
    pub reconnect_delay: Duration,
}

impl Default for HubOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            reconnect_delay: Duration::from_secs(1),
        }
    }
}

// =============================================================================
// CLIENT
// =============================================================================

struct Session<I> {
    invoker: Option<I>,
    pump: Option<JoinHandle<()>>,
}

struct Inner<T: Transport> {
    transport: T,
    options: HubOptions,
    /// Held while connecting; stores the outcome of the last `start`.
    start_gate: tokio::sync::Mutex<Result<(), HubError>>,
    /// Number of completed `start` calls.
    starts: AtomicU64,
    registry: Mutex<Registry>,
    session: Mutex<Session<T::Invoker>>,
    handshake: Mutex<Handshake>,
    state: watch::Sender<ConnectionState>,
    /// Bumped by `stop`; work started under an older generation is stale.
    generation: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Connection manager for the real-time hub.
///
/// Cheap to clone; clones share the connection and the subscribers.
pub struct HubClient<T: Transport> {
    inner: Arc<Inner<T>>,
}

impl<T: Transport> Clone for HubClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> std::fmt::Debug for HubClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubClient")
            .field("state", &*self.inner.state.borrow())
            .field("registry", &*lock(&self.inner.registry))
            .finish_non_exhaustive()
    }
}

impl<T: Transport> HubClient<T> {
    pub fn new(transport: T, options: HubOptions) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            inner: Arc::new(Inner {
                transport,
                options,
                start_gate: tokio::sync::Mutex::new(Ok(())),
                starts: AtomicU64::new(0),
                registry: Mutex::new(Registry::default()),
                session: Mutex::new(Session {
                    invoker: None,
                    pump: None,
                }),
                handshake: Mutex::new(Handshake::default()),
                state,
                generation: AtomicU64::new(0),
            }),
        }
    }

    // =========================================================================
    // CREDENTIALS
    // =========================================================================

    /// Bearer token for the next connection. Expired tokens are not sent.
    pub fn set_access_token(&self, token: Option<String>) {
        lock(&self.inner.handshake).access_token = token;
    }

    /// Cart token for the next connection.
    pub fn set_cart_token(&self, token: Option<CartToken>) {
        lock(&self.inner.handshake).cart_token = token;
    }

    // =========================================================================
    // CONNECTION
    // =========================================================================

    /// Open the connection, retrying per the policy.
    ///
    /// A start already in flight is awaited and its outcome shared instead of
    /// opening a second connection; starting while connected returns immediately.
    pub async fn start(&self) -> Result<(), HubError> {
        let observed = self.inner.starts.load(Ordering::SeqCst);
        let mut last = self.inner.start_gate.lock().await;
        if self.inner.starts.load(Ordering::SeqCst) != observed {
            return last.clone();
        }
        if self.is_connected() {
            tracing::debug!("Hub already connected");
            return Ok(());
        }

        let result = self.open().await;
        *last = result.clone();
        self.inner.starts.fetch_add(1, Ordering::SeqCst);
        result
    }

    async fn open(&self) -> Result<(), HubError> {
        let generation = self.inner.generation.load(Ordering::SeqCst);
        self.inner
            .transition(generation, ConnectionState::Connecting)?;
        let link = self.inner.connect_with_retry(generation).await?;

        let previous = {
            let mut session = lock(&self.inner.session);
            if self.inner.generation.load(Ordering::SeqCst) != generation {
                link.invoker.close();
                return Err(HubError::Cancelled);
            }
            session.invoker = Some(link.invoker);
            let pump = tokio::spawn(run_connection(
                Arc::downgrade(&self.inner),
                link.inbound,
                generation,
            ));
            let previous = session.pump.replace(pump);
            self.inner.set_state(ConnectionState::Connected);
            previous
        };
        if let Some(previous) = previous {
            previous.abort();
        }

        tracing::info!("Hub connected");
        Ok(())
    }

    /// Close the connection. Subscriptions are kept.
    pub async fn stop(&self) {
        let (invoker, pump) = {
            let mut session = lock(&self.inner.session);
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
            self.inner.set_state(ConnectionState::Disconnected);
            (session.invoker.take(), session.pump.take())
        };
        if let Some(invoker) = invoker {
            invoker.close();
        }
        if let Some(pump) = pump {
            pump.abort();
            let _ = pump.await;
        }
        tracing::info!("Hub stopped");
    }

    /// Stop, pause briefly, start again. Subscribers stay attached.
    pub async fn reconnect(&self) -> Result<(), HubError> {
        self.stop().await;
        tokio::time::sleep(self.inner.options.reconnect_delay).await;
        self.start().await
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.state.borrow().is_connected()
    }

    /// Receiver of every state change.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    // =========================================================================
    // SUBSCRIPTIONS
    // =========================================================================

    /// Register a callback for an event name (case-insensitive).
    pub fn on<F>(&self, event: &str, handler: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let subscription = lock(&self.inner.registry).add(event, Arc::new(handler));
        tracing::debug!(event = subscription.event(), "Subscribed");
        subscription
    }

    /// Remove one callback. Returns whether it was registered.
    pub fn off(&self, subscription: &Subscription) -> bool {
        lock(&self.inner.registry).remove(subscription)
    }

    /// Remove every callback for an event name.
    pub fn off_all(&self, event: &str) -> usize {
        lock(&self.inner.registry).remove_all(event)
    }

    #[must_use]
    pub fn subscriber_count(&self, event: &str) -> usize {
        lock(&self.inner.registry).count(event)
    }

    // =========================================================================
    // INVOKE
    // =========================================================================

    /// Call a server method. Failures are logged, never returned.
    pub async fn invoke(&self, target: &str, arguments: Vec<Value>) {
        if let Err(e) = self.try_invoke(target, arguments).await {
            tracing::warn!(method = target, error = %e, "Hub invoke failed");
        }
    }

    /// Call a server method and report failures.
    pub async fn try_invoke(&self, target: &str, arguments: Vec<Value>) -> Result<(), HubError> {
        let invoker = lock(&self.inner.session)
            .invoker
            .clone()
            .ok_or(HubError::NotConnected)?;
        invoker.invoke(target, arguments).await
    }
}

// =============================================================================
// CONNECTION INTERNALS
// =============================================================================

impl<T: Transport> Inner<T> {
    fn set_state(&self, state: ConnectionState) {
        tracing::debug!(%state, "Hub state");
        self.state.send_replace(state);
    }

    /// Publish a state unless `stop` ran since `generation` was read.
    fn transition(&self, generation: u64, state: ConnectionState) -> Result<(), HubError> {
        let _session = lock(&self.session);
        if self.generation.load(Ordering::SeqCst) != generation {
            return Err(HubError::Cancelled);
        }
        self.set_state(state);
        Ok(())
    }

    fn handshake(&self) -> Handshake {
        let mut handshake = lock(&self.handshake).clone();
        if handshake.access_token.is_some()
            && auth::usable_token(handshake.access_token.as_deref()).is_none()
        {
            tracing::warn!("Access token expired; connecting anonymously");
            handshake.access_token = None;
        }
        handshake
    }

    async fn connect_with_retry(&self, generation: u64) -> Result<Link<T::Invoker>, HubError> {
        let policy = self.options.retry;
        let mut failures = 0u32;

        loop {
            if self.generation.load(Ordering::SeqCst) != generation {
                return Err(HubError::Cancelled);
            }

            let handshake = self.handshake();
            let error = match self.transport.connect(&handshake).await {
                Ok(link) => return Ok(link),
                Err(e) => e,
            };

            failures = failures.saturating_add(1);
            if !policy.allows(failures) {
                let reason = error.to_string();
                self.transition(
                    generation,
                    ConnectionState::Failed {
                        reason: reason.clone(),
                    },
                )?;
                tracing::error!(attempts = failures, %reason, "Hub connection failed; giving up");
                return Err(HubError::Failed {
                    attempts: failures,
                    reason,
                });
            }

            let delay = policy.delay_for(failures);
            tracing::warn!(
                attempt = failures,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Hub connect failed; retrying"
            );
            self.transition(generation, ConnectionState::Reconnecting { attempt: failures })?;
            tokio::time::sleep(delay).await;
        }
    }

    /// Re-open a lost connection. Returns the new inbound channel, or `None`
    /// when the connection should not continue.
    async fn recover(&self, generation: u64) -> Option<mpsc::Receiver<InboundMessage>> {
        {
            let mut session = lock(&self.session);
            if self.generation.load(Ordering::SeqCst) != generation {
                return None;
            }
            if let Some(invoker) = session.invoker.take() {
                invoker.close();
            }
            self.set_state(ConnectionState::Reconnecting { attempt: 0 });
        }
        tracing::warn!("Hub connection lost; reconnecting");

        let _gate = self.start_gate.lock().await;
        if self.state.borrow().is_connected() {
            return None;
        }

        match self.connect_with_retry(generation).await {
            Ok(link) => {
                let mut session = lock(&self.session);
                if self.generation.load(Ordering::SeqCst) != generation {
                    link.invoker.close();
                    return None;
                }
                session.invoker = Some(link.invoker);
                self.set_state(ConnectionState::Connected);
                tracing::info!("Hub reconnected");
                Some(link.inbound)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Hub recovery ended");
                None
            }
        }
    }

    fn dispatch(&self, message: &InboundMessage) {
        let handlers = lock(&self.registry).handlers_for(&message.target);
        tracing::debug!(
            event = %message.target,
            subscribers = handlers.len(),
            "Hub event"
        );
        for handler in handlers {
            handler(&message.payload);
        }
    }
}

impl<T: Transport> Drop for Inner<T> {
    fn drop(&mut self) {
        let session = self.session.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(invoker) = session.invoker.take() {
            invoker.close();
        }
        if let Some(pump) = session.pump.take() {
            pump.abort();
        }
    }
}

/// Reads inbound events until the connection is stopped or cannot be recovered.
async fn run_connection<T: Transport>(
    inner: Weak<Inner<T>>,
    mut inbound: mpsc::Receiver<InboundMessage>,
    generation: u64,
) {
    loop {
        while let Some(message) = inbound.recv().await {
            let Some(strong) = inner.upgrade() else {
                return;
            };
            strong.dispatch(&message);
        }

        let Some(strong) = inner.upgrade() else {
            return;
        };
        match strong.recover(generation).await {
            Some(next) => inbound = next,
            None => return,
        }
    }
}
