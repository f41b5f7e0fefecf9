//! # Local Storage
//!
//! Durable client-side state: bearer token, cart token and the last cart
//! snapshot, kept in a single redb file.

mod local_store;

pub use local_store::{LocalStore, StoredSession};
