//! # bistro
//!
//! Client side of the Bistro point-of-sale system: the typed REST client,
//! the real-time hub client, the live cache binding and the command line.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    apps/bistro (THE CLIENT)                  │
//! │                                                              │
//! │  ┌──────────┐   ┌────────────┐   ┌─────────────────────────┐ │
//! │  │   CLI    │   │ REST (api) │   │ Hub (SSE) ──▶ LiveCart  │ │
//! │  │  (clap)  │   │ (reqwest)  │   │  retry + fan-out        │ │
//! │  └────┬─────┘   └─────┬──────┘   └───────────┬─────────────┘ │
//! │       └───────────────┼──────────────────────┘               │
//! │                       ▼                                      │
//! │               ┌───────────────┐                              │
//! │               │  bistro-core  │                              │
//! │               │  (THE MODEL)  │                              │
//! │               └───────────────┘                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod hub;
pub mod sync;

pub use api::{ApiClient, ClientError};
pub use config::{Config, ConfigError};
pub use hub::{ConnectionState, HubClient, HubError, HubOptions, RetryPolicy, SseTransport};
pub use sync::{Attachment, LiveCart, LiveState};
