//! # redb-backed Local Store
//!
//! A small key-value file standing in for browser local storage.
//!
//! | Key             | Value                                  |
//! |-----------------|----------------------------------------|
//! | `auth_token`    | UTF-8 bearer token                     |
//! | `cart_token`    | UTF-8 cart token                       |
//! | `cart_snapshot` | version byte + postcard-encoded `Cart` |
//!
//! Missing keys read as `None`. Each write is its own transaction.

use crate::primitives::{KEY_AUTH_TOKEN, KEY_CART_SNAPSHOT, KEY_CART_TOKEN, SNAPSHOT_VERSION};
use crate::{BistroError, Cart, CartToken};
use redb::{Database, ReadableDatabase, TableDefinition};
use std::path::Path;

/// Table for client state: key string -> raw bytes
const STATE: TableDefinition<&str, &[u8]> = TableDefinition::new("client_state");

/// Tokens restored on start-up.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoredSession {
    pub auth_token: Option<String>,
    pub cart_token: Option<CartToken>,
}

/// Persistent client state.
pub struct LocalStore {
    db: Database,
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore").finish_non_exhaustive()
    }
}

fn storage_err(e: impl std::fmt::Display) -> BistroError {
    BistroError::StorageError(e.to_string())
}

impl LocalStore {
    /// Open or create the store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BistroError> {
        let db = Database::create(path.as_ref()).map_err(storage_err)?;

        {
            let write_txn = db.begin_write().map_err(storage_err)?;
            let _ = write_txn.open_table(STATE).map_err(storage_err)?;
            write_txn.commit().map_err(storage_err)?;
        }

        Ok(Self { db })
    }

    /// Read raw bytes for a key.
    pub fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, BistroError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(STATE).map_err(storage_err)?;
        let value = table.get(key).map_err(storage_err)?;
        Ok(value.map(|v| v.value().to_vec()))
    }

    /// Write raw bytes for a key, replacing any previous value.
    pub fn set_bytes(&self, key: &str, value: &[u8]) -> Result<(), BistroError> {
        let write_txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = write_txn.open_table(STATE).map_err(storage_err)?;
            table.insert(key, value).map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)
    }

    /// Remove a key. Returns whether it existed.
    pub fn remove(&self, key: &str) -> Result<bool, BistroError> {
        let write_txn = self.db.begin_write().map_err(storage_err)?;
        let existed = {
            let mut table = write_txn.open_table(STATE).map_err(storage_err)?;
            let removed = table.remove(key).map_err(storage_err)?;
            removed.is_some()
        };
        write_txn.commit().map_err(storage_err)?;
        Ok(existed)
    }

    pub fn get_string(&self, key: &str) -> Result<Option<String>, BistroError> {
        match self.get_bytes(key)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| BistroError::SerializationError(e.to_string())),
            None => Ok(None),
        }
    }

    pub fn set_string(&self, key: &str, value: &str) -> Result<(), BistroError> {
        self.set_bytes(key, value.as_bytes())
    }

    // =========================================================================
    // SESSION
    // =========================================================================

    /// Load both tokens. Empty strings read as absent.
    pub fn session(&self) -> Result<StoredSession, BistroError> {
        let auth_token = self
            .get_string(KEY_AUTH_TOKEN)?
            .filter(|t| !t.is_empty());
        let cart_token = self
            .get_string(KEY_CART_TOKEN)?
            .filter(|t| !t.is_empty())
            .map(CartToken::new);
        Ok(StoredSession {
            auth_token,
            cart_token,
        })
    }

    pub fn set_auth_token(&self, token: &str) -> Result<(), BistroError> {
        self.set_string(KEY_AUTH_TOKEN, token)
    }

    pub fn set_cart_token(&self, token: &CartToken) -> Result<(), BistroError> {
        self.set_string(KEY_CART_TOKEN, token.as_str())
    }

    /// Forget the signed-in user and the cart. The file itself is kept.
    pub fn clear_session(&self) -> Result<(), BistroError> {
        self.remove(KEY_AUTH_TOKEN)?;
        self.remove(KEY_CART_TOKEN)?;
        self.remove(KEY_CART_SNAPSHOT)?;
        Ok(())
    }

    // =========================================================================
    // CART SNAPSHOT
    // =========================================================================

    /// Store the last known cart for offline display.
    pub fn save_cart(&self, cart: &Cart) -> Result<(), BistroError> {
        let payload =
            postcard::to_allocvec(cart).map_err(|e| BistroError::SerializationError(e.to_string()))?;
        let mut bytes = Vec::with_capacity(payload.len().saturating_add(1));
        bytes.push(SNAPSHOT_VERSION);
        bytes.extend_from_slice(&payload);
        self.set_bytes(KEY_CART_SNAPSHOT, &bytes)
    }

    /// Load the cart snapshot, if one was saved.
    pub fn load_cart(&self) -> Result<Option<Cart>, BistroError> {
        let Some(bytes) = self.get_bytes(KEY_CART_SNAPSHOT)? else {
            return Ok(None);
        };
        let Some((&version, payload)) = bytes.split_first() else {
            return Err(BistroError::SerializationError(
                "Empty cart snapshot".to_string(),
            ));
        };
        if version != SNAPSHOT_VERSION {
            return Err(BistroError::SerializationError(format!(
                "Unsupported snapshot version: {} (expected {})",
                version, SNAPSHOT_VERSION
            )));
        }
        postcard::from_bytes(payload)
            .map(Some)
            .map_err(|e| BistroError::SerializationError(e.to_string()))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CartItem, LineId, MenuItemId, Money, OptionId};
    use tempfile::tempdir;

    fn sample_cart() -> Cart {
        let mut cart = Cart::new(CartToken::new("cart-1"));
        cart.items.push(CartItem {
            id: LineId(4),
            menu_item_id: MenuItemId(2),
            name: "Pho".to_string(),
            quantity: 2,
            unit_price: Money(650),
            extra_price: Money(50),
            options: vec![OptionId(3)],
            note: Some("no cilantro".to_string()),
        });
        cart.recalculate();
        cart
    }

    #[test]
    fn missing_keys_are_none() {
        let temp = tempdir().expect("temp dir");
        let store = LocalStore::open(temp.path().join("state.redb")).expect("open");
        assert_eq!(store.session().expect("session"), StoredSession::default());
        assert!(store.load_cart().expect("load").is_none());
        assert!(!store.remove("nothing").expect("remove"));
    }

    #[test]
    fn session_survives_reopen() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("state.redb");
        {
            let store = LocalStore::open(&path).expect("open");
            store.set_auth_token("jwt-abc").expect("set");
            store
                .set_cart_token(&CartToken::new("cart-1"))
                .expect("set");
            store.save_cart(&sample_cart()).expect("save");
        }

        let store = LocalStore::open(&path).expect("reopen");
        let session = store.session().expect("session");
        assert_eq!(session.auth_token.as_deref(), Some("jwt-abc"));
        assert_eq!(session.cart_token, Some(CartToken::new("cart-1")));
        assert_eq!(store.load_cart().expect("load"), Some(sample_cart()));
    }

    #[test]
    fn clear_session_removes_tokens() {
        let temp = tempdir().expect("temp dir");
        let store = LocalStore::open(temp.path().join("state.redb")).expect("open");
        store.set_auth_token("jwt").expect("set");
        store.save_cart(&sample_cart()).expect("save");
        store.clear_session().expect("clear");
        assert_eq!(store.session().expect("session"), StoredSession::default());
        assert!(store.load_cart().expect("load").is_none());
    }

    #[test]
    fn snapshot_version_checked() {
        let temp = tempdir().expect("temp dir");
        let store = LocalStore::open(temp.path().join("state.redb")).expect("open");
        store
            .set_bytes(KEY_CART_SNAPSHOT, &[SNAPSHOT_VERSION + 1, 0])
            .expect("set");
        assert!(matches!(
            store.load_cart(),
            Err(BistroError::SerializationError(_))
        ));
    }
}
